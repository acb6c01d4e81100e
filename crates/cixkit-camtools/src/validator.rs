//! Drill-test validation
//!
//! Cross-checks resolved groups against the tooling inventory and the
//! generation config. Every check runs and every failure is collected, so a
//! single pass reports all problems at once.

use crate::selection::ResolvedGroup;
use cixkit_core::{format_mm, GenerationConfig, ToolInventory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Emission must not proceed
    Fatal,
    /// Worth reporting, output is still produced
    Advisory,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Whether the finding blocks emission
    pub severity: Severity,
    /// Text shown to the operator
    pub message: String,
}

impl Diagnostic {
    /// A finding that blocks emission
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    /// A finding reported alongside the output
    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Advisory,
            message: message.into(),
        }
    }

    /// True for [`Severity::Fatal`]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// True when any diagnostic blocks emission
pub fn has_fatal(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_fatal)
}

/// Validate resolved groups; an empty result means the test can be emitted
///
/// Findings are returned in check order: spindle existence and diameter per
/// group, then spacing, depth, depth limits, and finally layout wrapping.
pub fn validate(
    groups: &[ResolvedGroup],
    inventory: &ToolInventory,
    config: &GenerationConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for group in groups {
        let mut seen = HashSet::new();
        for &spindle in &group.spindles {
            if !seen.insert(spindle) {
                diagnostics.push(Diagnostic::advisory(format!(
                    "Spindle {} listed more than once for {}mm",
                    spindle,
                    format_mm(group.diameter.mm())
                )));
                continue;
            }

            match inventory.get(spindle) {
                None => diagnostics.push(Diagnostic::fatal(format!(
                    "Spindle {} not found in XML",
                    spindle
                ))),
                Some(tool)
                    if !tool
                        .diameter
                        .matches(group.diameter, config.diameter_tolerance) =>
                {
                    diagnostics.push(Diagnostic::fatal(format!(
                        "Spindle {}: expected {}mm, XML has {}mm",
                        spindle,
                        format_mm(group.diameter.mm()),
                        format_mm(tool.diameter.mm())
                    )))
                }
                Some(_) => {}
            }
        }
    }

    for value in [config.spacing_x, config.spacing_y] {
        if value < config.min_spacing {
            diagnostics.push(Diagnostic::fatal(format!(
                "Spacing too small: {} < {}",
                value, config.min_spacing
            )));
        }
    }

    if config.drill_depth <= 0.0 {
        diagnostics.push(Diagnostic::fatal("Drill depth must be positive"));
    } else if config.drill_depth > config.max_depth {
        diagnostics.push(Diagnostic::fatal(format!(
            "Drill depth {} exceeds maximum {}",
            config.drill_depth, config.max_depth
        )));
    }

    for limit in &config.depth_limits {
        if limit.max_depth > config.max_depth {
            diagnostics.push(Diagnostic::fatal(format!(
                "Depth limit for {}mm exceeds maximum ({} > {})",
                format_mm(limit.diameter.mm()),
                limit.max_depth,
                config.max_depth
            )));
        }
    }

    let items: usize = groups.iter().map(|group| 1 + group.spindles.len()).sum();
    let per_row = config.max_tools_per_row.max(1);
    if items > per_row {
        let rows = items.div_ceil(per_row);
        diagnostics.push(Diagnostic::advisory(format!(
            "Layout wraps: {} items exceed {} per row ({} rows)",
            items, per_row, rows
        )));
    }

    debug!(
        fatal = diagnostics.iter().filter(|d| d.is_fatal()).count(),
        total = diagnostics.len(),
        "Validated drill test"
    );

    diagnostics
}
