//! Drill-test generator
//!
//! Runs the whole pipeline for one tooling inventory: resolve the selection,
//! validate it, lay it out and emit the CIX program. Emission is refused
//! while any fatal diagnostic remains.

use crate::emitter::emit;
use crate::error::{DrillTestResult, ValidationFailure};
use crate::layout::{layout, Placement};
use crate::selection::{resolve, ResolvedGroup};
use crate::validator::{has_fatal, validate, Diagnostic};
use cixkit_core::{GenerationConfig, SelectionRequest, ToolInventory};
use tracing::{debug, info};

/// Resolved, validated and laid-out drill test, before emission
#[derive(Debug, Clone, PartialEq)]
pub struct DrillTestPlan {
    /// Diameter groups in ascending order
    pub groups: Vec<ResolvedGroup>,
    /// Every diagnostic, fatal and advisory
    pub diagnostics: Vec<Diagnostic>,
    /// Labels and drills with their grid slots
    pub placements: Vec<Placement>,
}

impl DrillTestPlan {
    /// True when the plan may be emitted
    pub fn is_emittable(&self) -> bool {
        !has_fatal(&self.diagnostics)
    }

    /// Number of drill macros the plan produces
    pub fn drill_count(&self) -> usize {
        self.groups.iter().map(|group| group.spindles.len()).sum()
    }
}

/// A rendered drill test
#[derive(Debug, Clone, PartialEq)]
pub struct DrillTestOutput {
    /// CIX program text, newline terminated
    pub content: String,
    /// Non-fatal diagnostics raised while planning
    pub advisories: Vec<Diagnostic>,
    /// Number of `BG` drill macros
    pub drill_blocks: usize,
    /// Number of engraved labels
    pub engraving_blocks: usize,
}

/// Generator for CIX drill-test programs
pub struct DrillTestGenerator {
    config: GenerationConfig,
    inventory: ToolInventory,
}

impl DrillTestGenerator {
    /// Create a new DrillTestGenerator for one tooling inventory
    pub fn new(config: GenerationConfig, inventory: ToolInventory) -> Self {
        Self { config, inventory }
    }

    /// Generation parameters in use
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Tooling the generator checks against
    pub fn inventory(&self) -> &ToolInventory {
        &self.inventory
    }

    /// Resolve, validate and lay out a selection without emitting
    ///
    /// Fatal diagnostics do not abort planning; they are returned in the plan.
    pub fn plan(&self, request: &SelectionRequest) -> DrillTestResult<DrillTestPlan> {
        let groups = resolve(request, &self.inventory)?;
        let diagnostics = validate(&groups, &self.inventory, &self.config);
        let placements = layout(&groups, &self.config);

        debug!(
            groups = groups.len(),
            placements = placements.len(),
            diagnostics = diagnostics.len(),
            "Planned drill test"
        );

        Ok(DrillTestPlan {
            groups,
            diagnostics,
            placements,
        })
    }

    /// Generate the CIX program, refusing when any diagnostic is fatal
    pub fn generate(&self, request: &SelectionRequest) -> DrillTestResult<DrillTestOutput> {
        let plan = self.plan(request)?;

        let (fatal, advisories): (Vec<Diagnostic>, Vec<Diagnostic>) = plan
            .diagnostics
            .iter()
            .cloned()
            .partition(Diagnostic::is_fatal);
        if !fatal.is_empty() {
            return Err(ValidationFailure::new(fatal).into());
        }

        let lines = emit(&plan.placements, &self.config)?;
        let output = DrillTestOutput {
            content: lines.join("\n"),
            advisories,
            drill_blocks: plan.drill_count(),
            engraving_blocks: plan.groups.len(),
        };

        info!(
            "Generated drill test: {} drills across {} diameters",
            output.drill_blocks, output.engraving_blocks
        );
        Ok(output)
    }
}

/// Parse tooling XML and generate a drill test in one call
pub fn generate_drill_test(
    xml: &str,
    request: &SelectionRequest,
    config: &GenerationConfig,
) -> DrillTestResult<DrillTestOutput> {
    let inventory = ToolInventory::load(xml)?;
    DrillTestGenerator::new(config.clone(), inventory).generate(request)
}
