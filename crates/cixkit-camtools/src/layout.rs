//! Grid layout for drill-test operations
//!
//! Labels and drills share one row-major grid. Each diameter group places
//! its label first, then one drill per spindle; the column counter runs on
//! across groups and wraps to a new row at `max_tools_per_row`.

use crate::selection::ResolvedGroup;
use cixkit_core::{Diameter, GenerationConfig, SpindleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated width of an engraved label (mm)
pub const LABEL_EXTENT_X: f64 = 50.0;

/// Estimated height of an engraved label (mm)
pub const LABEL_EXTENT_Y: f64 = 6.0;

/// One thing to place on the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Engraved text naming a diameter group
    Label { diameter: Diameter, text: String },
    /// Single hole drilled by one spindle
    Drill {
        diameter: Diameter,
        spindle: SpindleId,
    },
}

impl Operation {
    /// Diameter of the group the operation belongs to
    pub fn diameter(&self) -> Diameter {
        match self {
            Self::Label { diameter, .. } | Self::Drill { diameter, .. } => *diameter,
        }
    }

    /// True for an engraved label
    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label { text, .. } => write!(f, "label {}", text),
            Self::Drill { spindle, .. } => write!(f, "drill T{}", spindle),
        }
    }
}

/// Grid position of an operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSlot {
    /// Panel X (mm)
    pub x: f64,
    /// Panel Y (mm)
    pub y: f64,
    /// Zero-based grid row
    pub row_index: usize,
    /// Zero-based grid column
    pub column_index: usize,
}

/// An operation together with its slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// What is machined
    pub operation: Operation,
    /// Where it is machined
    pub slot: LayoutSlot,
}

/// Assign grid slots to every label and drill
///
/// Groups are placed in ascending diameter order regardless of the order
/// they arrive in; spindles keep their given order.
pub fn layout(groups: &[ResolvedGroup], config: &GenerationConfig) -> Vec<Placement> {
    let mut ordered: Vec<&ResolvedGroup> = groups.iter().collect();
    ordered.sort_by_key(|group| group.diameter);

    let per_row = config.max_tools_per_row.max(1);
    let capacity = groups.iter().map(|group| 1 + group.spindles.len()).sum();
    let mut placements = Vec::with_capacity(capacity);
    let mut row = 0;
    let mut column = 0;

    let mut place = |operation: Operation| {
        let slot = LayoutSlot {
            x: config.start_x + column as f64 * config.spacing_x,
            y: config.start_y + row as f64 * config.spacing_y,
            row_index: row,
            column_index: column,
        };
        placements.push(Placement { operation, slot });

        column += 1;
        if column == per_row {
            column = 0;
            row += 1;
        }
    };

    for group in ordered {
        place(Operation::Label {
            diameter: group.diameter,
            text: group.label_text.clone(),
        });
        for &spindle in &group.spindles {
            place(Operation::Drill {
                diameter: group.diameter,
                spindle,
            });
        }
    }

    placements
}

/// Extents of the placed operations, always including the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBounds {
    /// Left edge (mm), never above zero
    pub min_x: f64,
    /// Bottom edge (mm), never above zero
    pub min_y: f64,
    /// Right edge (mm)
    pub max_x: f64,
    /// Top edge (mm)
    pub max_y: f64,
}

impl LayoutBounds {
    /// Drills extend by their radius, labels by the estimated text box
    pub fn from_slots(placements: &[Placement]) -> Self {
        let mut bounds = Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        };

        for Placement { operation, slot } in placements {
            let (left, bottom, right, top) = match operation {
                Operation::Label { .. } => (
                    slot.x,
                    slot.y,
                    slot.x + LABEL_EXTENT_X,
                    slot.y + LABEL_EXTENT_Y,
                ),
                Operation::Drill { diameter, .. } => {
                    let r = diameter.radius();
                    (slot.x - r, slot.y - r, slot.x + r, slot.y + r)
                }
            };
            bounds.min_x = bounds.min_x.min(left);
            bounds.min_y = bounds.min_y.min(bottom);
            bounds.max_x = bounds.max_x.max(right);
            bounds.max_y = bounds.max_y.max(top);
        }

        bounds
    }

    /// Horizontal extent (mm)
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent (mm)
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
