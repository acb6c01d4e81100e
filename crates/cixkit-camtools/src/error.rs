//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for drill-test generation:
//! emission contract violations, collected validation failures, and the
//! umbrella error returned by the generation pipeline.

use crate::validator::Diagnostic;
use cixkit_core::{ConfigError, ParseError};
use thiserror::Error;

/// Errors raised while rendering CIX statements.
///
/// These indicate a broken contract between the layout and the emitter,
/// never a user-level tooling mismatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmissionError {
    /// A slot was placed left of or below the panel origin.
    #[error("Slot for {operation} has a negative coordinate ({x}, {y})")]
    NegativeCoordinate { operation: String, x: f64, y: f64 },

    /// A slot coordinate is NaN or infinite.
    #[error("Slot for {operation} has a non-finite coordinate")]
    NonFiniteCoordinate { operation: String },

    /// A drill was placed without the label of its diameter group before it.
    #[error("Drill for spindle {spindle} ({diameter}mm) is not preceded by its label")]
    OrphanDrill { spindle: u32, diameter: String },
}

/// Fatal validation diagnostics that stopped emission.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation failed: {}", join_messages(.diagnostics))]
pub struct ValidationFailure {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationFailure {
    /// Wrap the fatal diagnostics of a validation pass.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// The diagnostics that caused the failure.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn join_messages(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during drill-test generation.
#[derive(Error, Debug)]
pub enum DrillTestError {
    /// The tooling XML could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The selection or config is malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation found fatal problems; nothing was emitted.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The emitter detected a contract violation.
    #[error("CIX emission failed: {0}")]
    Emission(#[from] EmissionError),
}

/// Result type alias for drill-test generation.
pub type DrillTestResult<T> = Result<T, DrillTestError>;
