//! Error handling for CixKit
//!
//! Provides the error types shared by every stage of drill-test generation:
//! - Parse errors (malformed tool-inventory XML)
//! - Config errors (malformed selection or generation settings)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Tool inventory parse error
///
/// Raised while reading the machine's spindle tooling XML. A parse error is
/// unrecoverable: no generation is attempted from a partial inventory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The document is not well-formed XML
    #[error("Malformed tooling XML: {reason}")]
    Xml {
        /// The reason reported by the XML reader.
        reason: String,
    },

    /// A `Spindle` element lacks a required attribute
    #[error("Spindle #{index} is missing the '{attribute}' attribute")]
    MissingAttribute {
        /// Zero-based position of the element among `Spindle` elements.
        index: usize,
        /// The attribute that was missing or empty.
        attribute: &'static str,
    },

    /// The `Name` attribute does not carry a spindle number
    #[error("Invalid spindle name: {name:?}")]
    InvalidSpindleName {
        /// The raw `Name` attribute value.
        name: String,
    },

    /// The `Child` attribute is not a positive `D{value}` diameter code
    #[error("Invalid diameter code: {code:?}")]
    InvalidDiameter {
        /// The raw `Child` attribute value.
        code: String,
    },

    /// The same spindle id appears twice
    #[error("Duplicate spindle id {id}")]
    DuplicateSpindle {
        /// The repeated spindle id.
        id: u32,
    },
}

/// Configuration error type
///
/// Represents a malformed selection request or generation config. Raised at
/// the boundary where settings are frozen, before any generation starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A custom selection lists no diameters at all
    #[error("Custom tool selection is empty")]
    EmptySelection,

    /// A diameter entry lists no spindles
    #[error("No spindles specified for diameter {diameter}mm")]
    EmptySpindleList {
        /// The diameter with the empty list, formatted in mm.
        diameter: String,
    },

    /// Two custom entries share one nominal diameter
    #[error("Diameter {diameter}mm is listed more than once")]
    DuplicateDiameter {
        /// The repeated diameter, formatted in mm.
        diameter: String,
    },

    /// A diameter is zero, negative or not a number
    #[error("Invalid diameter: {value}")]
    InvalidDiameter {
        /// The rejected value.
        value: f64,
    },

    /// A spindle id of zero was supplied
    #[error("Invalid spindle id: {id} (ids start at 1)")]
    InvalidSpindleId {
        /// The rejected id.
        id: u32,
    },

    /// A value is outside of its accepted range
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
    },

    /// A value is invalid for a reason other than its range
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for CixKit core
///
/// A unified error type for callers that load an inventory and build a
/// config in one go.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool inventory parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this is a config error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
