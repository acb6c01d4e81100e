//! # CIXKit CAM Tools
//!
//! Drill-test generation for Biesse CNC routers. A tooling inventory and a
//! tool selection are turned into a CID3 (`.cix`) program that engraves a
//! label for every tool diameter and drills one hole per spindle.
//!
//! ## Pipeline
//!
//! - **Selection**: resolve `AllTools` or a custom diameter map into groups
//! - **Validator**: cross-check groups against the inventory and config
//! - **Layout**: place labels and drills on a row-major grid
//! - **Emitter**: render the grid as CIX macros
//! - **Drill Test**: the generator that runs the stages in order

pub mod drill_test;
pub mod emitter;
pub mod error;
pub mod layout;
pub mod selection;
pub mod validator;

pub use drill_test::{generate_drill_test, DrillTestGenerator, DrillTestOutput, DrillTestPlan};
pub use emitter::{emit, panel_dimensions};
pub use error::{DrillTestError, DrillTestResult, EmissionError, ValidationFailure};
pub use layout::{layout, LayoutBounds, LayoutSlot, Operation, Placement};
pub use selection::{resolve, ResolvedGroup};
pub use validator::{has_fatal, validate, Diagnostic, Severity};
