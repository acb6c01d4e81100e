//! # CixKit
//!
//! Generates drill-test programs for Biesse CNC routers. A spindle tooling
//! XML export and a drill-test settings file go in; a CID3 `.cix` program
//! comes out, with an engraved label per tool diameter and one drilled hole
//! per spindle.
//!
//! ## Architecture
//!
//! 1. **cixkit-core** - Units, tool inventory, generation config, errors
//! 2. **cixkit-camtools** - Selection, validation, layout and CIX emission
//! 3. **cixkit-settings** - JSON/TOML drill-test settings files
//! 4. **cixkit** - Command-line binary that ties the crates together

pub use cixkit_camtools::{
    generate_drill_test, Diagnostic, DrillTestError, DrillTestGenerator, DrillTestOutput,
    DrillTestPlan, Severity,
};
pub use cixkit_core::{
    ConfigError, CustomSelection, GenerationConfig, ParseError, SelectionRequest, ToolInventory,
};
pub use cixkit_settings::{DrillTestSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so program text can go to stdout
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
