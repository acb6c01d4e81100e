//! Unit and identifier types
//!
//! Handles the typed values that flow through drill-test generation:
//! tool diameters in millimetres, spindle ids, and fractional-inch
//! diameter codes.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Default tolerance for matching a requested diameter against the inventory (mm)
pub const DEFAULT_DIAMETER_TOLERANCE: f64 = 0.01;

/// Tool diameter in millimetres
///
/// Always finite and strictly positive. Ordering is total so diameters can
/// key a `BTreeMap`; nominal equality between a requested and a measured
/// diameter goes through [`Diameter::matches`] with an explicit tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Diameter(f64);

impl Diameter {
    /// Create a diameter, rejecting zero, negative and non-finite values
    pub fn new(mm: f64) -> Result<Self, ConfigError> {
        if mm.is_finite() && mm > 0.0 {
            Ok(Self(mm))
        } else {
            Err(ConfigError::InvalidDiameter { value: mm })
        }
    }

    /// Diameter in millimetres
    pub fn mm(self) -> f64 {
        self.0
    }

    /// Radius in millimetres
    pub fn radius(self) -> f64 {
        self.0 / 2.0
    }

    /// True when both diameters agree within `tolerance` millimetres
    pub fn matches(self, other: Diameter, tolerance: f64) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

impl PartialEq for Diameter {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Diameter {}

impl PartialOrd for Diameter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diameter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Diameter {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Diameter> for f64 {
    fn from(value: Diameter) -> Self {
        value.0
    }
}

impl fmt::Display for Diameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Spindle (tool holder) number on the machine's drilling head
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SpindleId(u32);

impl SpindleId {
    /// Create a spindle id; ids start at 1
    pub fn new(id: u32) -> Result<Self, ConfigError> {
        if id == 0 {
            Err(ConfigError::InvalidSpindleId { id })
        } else {
            Ok(Self(id))
        }
    }

    /// Raw spindle number
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SpindleId {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpindleId> for u32 {
    fn from(value: SpindleId) -> Self {
        value.0
    }
}

impl fmt::Display for SpindleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format a millimetre value for diagnostics
///
/// Keeps at least one decimal and at most three, so `10.0` stays `10.0`
/// while `6.35` is not rounded away.
pub fn format_mm(value: f64) -> String {
    let mut text = format!("{:.3}", value);
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    text
}

/// Parse an underscore-separated inch fraction (`1_4` = 1/4") into millimetres
pub fn parse_inch_fraction(input: &str) -> Result<f64, String> {
    let (numerator, denominator) = input
        .split_once('_')
        .ok_or_else(|| "Invalid fraction format".to_string())?;
    let num = numerator
        .parse::<f64>()
        .map_err(|_| "Invalid numerator".to_string())?;
    let den = denominator
        .parse::<f64>()
        .map_err(|_| "Invalid denominator".to_string())?;
    if den == 0.0 {
        return Err("Division by zero".to_string());
    }
    Ok(num / den * MM_PER_INCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diameter_rejects_non_positive() {
        assert!(Diameter::new(5.0).is_ok());
        assert_eq!(
            Diameter::new(0.0),
            Err(ConfigError::InvalidDiameter { value: 0.0 })
        );
        assert!(Diameter::new(-2.0).is_err());
        assert!(Diameter::new(f64::NAN).is_err());
        assert!(Diameter::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_diameter_tolerance_matching() {
        let five = Diameter::new(5.0).unwrap();
        assert!(five.matches(Diameter::new(5.005).unwrap(), DEFAULT_DIAMETER_TOLERANCE));
        assert!(!five.matches(Diameter::new(5.02).unwrap(), DEFAULT_DIAMETER_TOLERANCE));
        assert!(five.matches(Diameter::new(5.02).unwrap(), 0.1));
    }

    #[test]
    fn test_diameter_ordering_and_display() {
        let mut values = vec![
            Diameter::new(8.0).unwrap(),
            Diameter::new(5.0).unwrap(),
            Diameter::new(6.4).unwrap(),
        ];
        values.sort();
        let shown: Vec<String> = values.iter().map(|d| d.to_string()).collect();
        assert_eq!(shown, vec!["5.0", "6.4", "8.0"]);
    }

    #[test]
    fn test_spindle_id() {
        assert_eq!(SpindleId::new(7).unwrap().get(), 7);
        assert_eq!(
            SpindleId::new(0),
            Err(ConfigError::InvalidSpindleId { id: 0 })
        );
    }

    #[test]
    fn test_format_mm() {
        assert_eq!(format_mm(10.0), "10.0");
        assert_eq!(format_mm(6.35), "6.35");
        assert_eq!(format_mm(5.02), "5.02");
        assert_eq!(format_mm(0.125), "0.125");
    }

    #[test]
    fn test_inch_fraction() {
        assert!((parse_inch_fraction("1_4").unwrap() - 6.35).abs() < 1e-9);
        assert!((parse_inch_fraction("1_2").unwrap() - 12.7).abs() < 1e-9);
        assert!(parse_inch_fraction("1_0").is_err());
        assert!(parse_inch_fraction("14").is_err());
        assert!(parse_inch_fraction("a_4").is_err());
    }
}
