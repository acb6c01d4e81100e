//! # CixKit Core
//!
//! Core types and utilities for CixKit.
//! Provides the spindle tooling inventory, typed diameters and spindle ids,
//! the frozen generation config, and the error types shared by every
//! drill-test generation stage.

pub mod config;
pub mod data;
pub mod error;
pub mod units;

pub use config::{
    CustomSelection, DepthLimit, GenerationConfig, GenerationConfigBuilder, PanelSize,
    SelectionRequest,
};

pub use data::{ToolEntry, ToolInventory};

pub use error::{ConfigError, Error, ParseError, Result};

pub use units::{format_mm, Diameter, SpindleId, DEFAULT_DIAMETER_TOLERANCE, MM_PER_INCH};
