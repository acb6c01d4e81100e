//! Data models for the machine's drilling head
//!
//! This module provides:
//! - Spindle tool entries and the tooling inventory
//! - XML loading of the spindle tooling export

pub mod tools;

pub use tools::{parse_diameter_code, parse_spindle_name, ToolEntry, ToolInventory};
