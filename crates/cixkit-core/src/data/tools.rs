//! Spindle tooling inventory
//!
//! This module provides:
//! - Tool entries (spindle number, diameter, description)
//! - Loading the machine's spindle tooling XML
//! - Diameter grouping and tolerance-aware lookup
//! - A printable tool summary

use crate::error::ParseError;
use crate::units::{parse_inch_fraction, Diameter, SpindleId, DEFAULT_DIAMETER_TOLERANCE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Expected name of the tooling document's root element
pub const TOOLING_ROOT: &str = "Tooling";

/// Element carrying one spindle's tool
pub const SPINDLE_ELEMENT: &str = "Spindle";

/// A tool loaded in one spindle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Spindle the tool is loaded in
    pub spindle_id: SpindleId,
    /// Tool diameter
    pub diameter: Diameter,
    /// Raw `Child (Name)` text from the tooling file
    pub description: String,
}

impl std::fmt::Display for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tool(ID={}, D={}mm, {})",
            self.spindle_id, self.diameter, self.description
        )
    }
}

/// The machine's spindle → tool mapping
///
/// Built once from the tooling XML and read-only afterwards. Spindles are
/// kept in ascending id order; the diameter grouping is derived at load
/// time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolInventory {
    tools: BTreeMap<SpindleId, ToolEntry>,
    groups: BTreeMap<Diameter, Vec<SpindleId>>,
}

impl ToolInventory {
    /// Parse a tooling XML document
    ///
    /// Every `Spindle` element, at any depth, must carry a `Name` (spindle
    /// number, optionally prefixed like `T7`) and a `Child` diameter code
    /// (`D10`, `D10MM70`, `D1_4IN70`).
    pub fn load(source: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut inventory = ToolInventory::default();
        let mut root_checked = false;
        let mut index = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                    if !root_checked {
                        root_checked = true;
                        let root = String::from_utf8_lossy(element.local_name().as_ref())
                            .into_owned();
                        if root != TOOLING_ROOT {
                            warn!(root = %root, "Tooling XML root is not <{}>", TOOLING_ROOT);
                        }
                    }
                    if element.local_name().as_ref() == SPINDLE_ELEMENT.as_bytes() {
                        let entry = parse_spindle(&element, index)?;
                        index += 1;
                        inventory.insert(entry)?;
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ParseError::Xml {
                        reason: e.to_string(),
                    })
                }
            }
        }

        if !root_checked {
            return Err(ParseError::Xml {
                reason: "document has no root element".to_string(),
            });
        }

        info!(
            tools = inventory.len(),
            diameters = inventory.groups.len(),
            "Loaded spindle tooling"
        );
        Ok(inventory)
    }

    /// Build an inventory from already-parsed entries
    pub fn from_entries(entries: impl IntoIterator<Item = ToolEntry>) -> Result<Self, ParseError> {
        let mut inventory = ToolInventory::default();
        for entry in entries {
            inventory.insert(entry)?;
        }
        Ok(inventory)
    }

    fn insert(&mut self, entry: ToolEntry) -> Result<(), ParseError> {
        let id = entry.spindle_id;
        let diameter = entry.diameter;
        match self.tools.entry(id) {
            Entry::Occupied(_) => return Err(ParseError::DuplicateSpindle { id: id.get() }),
            Entry::Vacant(slot) => {
                debug!(spindle = %id, diameter = %diameter, "Registered spindle");
                slot.insert(entry);
            }
        }
        // Diameters within tolerance share the first-seen key.
        let key = self
            .groups
            .keys()
            .copied()
            .find(|existing| existing.matches(diameter, DEFAULT_DIAMETER_TOLERANCE))
            .unwrap_or(diameter);
        let spindles = self.groups.entry(key).or_default();
        // Keep ascending id order regardless of document order.
        let position = spindles.partition_point(|existing| *existing < id);
        spindles.insert(position, id);
        Ok(())
    }

    /// Get the tool in a spindle
    pub fn get(&self, id: SpindleId) -> Option<&ToolEntry> {
        self.tools.get(&id)
    }

    /// Number of loaded spindles
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when the tooling file listed no spindles
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tools in ascending spindle order
    pub fn iter(&self) -> impl Iterator<Item = &ToolEntry> {
        self.tools.values()
    }

    /// Spindles whose tool matches `diameter` within `tolerance`, ascending
    pub fn spindles_for(&self, diameter: Diameter, tolerance: f64) -> Vec<SpindleId> {
        self.tools
            .values()
            .filter(|tool| tool.diameter.matches(diameter, tolerance))
            .map(|tool| tool.spindle_id)
            .collect()
    }

    /// Distinct diameters present, ascending, merged within the default tolerance
    pub fn all_diameters(&self) -> Vec<Diameter> {
        self.groups.keys().copied().collect()
    }

    /// Diameter → ascending spindle ids, as loaded
    pub fn diameter_groups(&self) -> &BTreeMap<Diameter, Vec<SpindleId>> {
        &self.groups
    }

    /// Human-readable tool summary, one line per diameter plus totals
    pub fn summary(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .groups
            .iter()
            .map(|(diameter, spindles)| {
                let ids: Vec<String> = spindles.iter().map(|id| id.to_string()).collect();
                format!("{:>5.1}mm: spindles [{}]", diameter.mm(), ids.join(", "))
            })
            .collect();
        lines.push(format!("Total tools: {}", self.tools.len()));
        lines.push(format!("Total diameters: {}", self.groups.len()));
        lines
    }
}

fn parse_spindle(element: &BytesStart<'_>, index: usize) -> Result<ToolEntry, ParseError> {
    let name = required_attribute(element, "Name", index)?;
    let child = required_attribute(element, "Child", index)?;

    let spindle_id = parse_spindle_name(&name)?;
    let diameter = parse_diameter_code(&child)?;

    Ok(ToolEntry {
        spindle_id,
        diameter,
        description: format!("{} ({})", child, name),
    })
}

fn required_attribute(
    element: &BytesStart<'_>,
    attribute: &'static str,
    index: usize,
) -> Result<String, ParseError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml {
            reason: e.to_string(),
        })?;
        if attr.key.as_ref() == attribute.as_bytes() {
            let value = attr.unescape_value().map_err(|e| ParseError::Xml {
                reason: e.to_string(),
            })?;
            let value = value.trim();
            if value.is_empty() {
                break;
            }
            return Ok(value.to_string());
        }
    }
    Err(ParseError::MissingAttribute { index, attribute })
}

/// Extract the spindle number from a `Name` attribute (`7`, `T7`, `TP1`)
pub fn parse_spindle_name(name: &str) -> Result<SpindleId, ParseError> {
    let invalid = || ParseError::InvalidSpindleName {
        name: name.to_string(),
    };
    let digits = name
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let id = digits.parse::<u32>().map_err(|_| invalid())?;
    SpindleId::new(id).map_err(|_| invalid())
}

/// Parse a `Child` diameter code into millimetres
///
/// Accepts `D{decimal}` plus the machine export forms `D{decimal}MM{len}`
/// and `D{num}_{den}IN{len}` (inch fraction).
pub fn parse_diameter_code(code: &str) -> Result<Diameter, ParseError> {
    let invalid = || ParseError::InvalidDiameter {
        code: code.to_string(),
    };
    let upper = code.trim().to_ascii_uppercase();
    let body = upper.strip_prefix('D').ok_or_else(invalid)?;

    let mm = if let Some((number, _)) = body.split_once("MM") {
        number.parse::<f64>().map_err(|_| invalid())?
    } else if let Some((fraction, _)) = body.split_once("IN") {
        parse_inch_fraction(fraction).map_err(|_| invalid())?
    } else {
        body.parse::<f64>().map_err(|_| invalid())?
    };

    Diameter::new(mm).map_err(|_| invalid())
}
