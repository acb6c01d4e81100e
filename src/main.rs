//! cixkit - drill-test CIX generator
//!
//! Reads a spindle tooling XML (or every XML in a tooling folder), builds a
//! drill test from the settings file and writes the CIX program.

use anyhow::{bail, Context, Result};
use clap::Parser;
use cixkit::{
    init_logging, Diagnostic, DrillTestError, DrillTestGenerator, DrillTestSettings,
    GenerationConfig, SelectionRequest, ToolInventory,
};
use cixkit_settings::SelectionMode;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "cixkit")]
#[command(about = "Generate Biesse CID3 drill-test programs from spindle tooling XML", long_about = None)]
struct Cli {
    /// Drill-test settings file (.toml or .json)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Tooling XML to read, overriding the settings file
    #[arg(short, long)]
    xml: Option<PathBuf>,

    /// CIX file to write, overriding the settings file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Generate one program per *.xml file in this folder
    #[arg(long, conflicts_with = "xml")]
    tooling_dir: Option<PathBuf>,

    /// Test every tool in the XML, ignoring any custom selection
    #[arg(long)]
    all: bool,

    /// Print the tool summary for each XML
    #[arg(long)]
    summary: bool,

    /// Validate and report without writing any file
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let mut settings = match &cli.settings {
        Some(path) => DrillTestSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DrillTestSettings::new(),
    };
    if let Some(xml) = &cli.xml {
        settings.tool_xml_file = xml.clone();
    }
    if let Some(output) = &cli.output {
        settings.output_file = output.clone();
    }
    if cli.all {
        settings.selection.mode = SelectionMode::All;
    }

    let (config, request) = settings.freeze().context("Invalid drill-test settings")?;

    match &cli.tooling_dir {
        Some(dir) => run_batch(dir, &config, &request, &cli),
        None => run_single(&config, &request, &cli),
    }
}

fn run_batch(
    dir: &Path,
    config: &GenerationConfig,
    request: &SelectionRequest,
    cli: &Cli,
) -> Result<()> {
    let mut xml_files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Tooling folder not found: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect();
    xml_files.sort();

    if xml_files.is_empty() {
        bail!("No XML files found in tooling folder: {}", dir.display());
    }

    let mut failed = 0;
    for xml_file in &xml_files {
        info!("Processing XML file: {}", xml_file.display());

        let stem = xml_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut file_config = config.clone();
        file_config.tool_xml_file = xml_file.clone();
        file_config.output_file = config.output_file.with_file_name(format!("{}.cix", stem));

        if let Err(err) = run_single(&file_config, request, cli) {
            error!("Failed to generate CIX for {}: {:#}", xml_file.display(), err);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} tooling files failed", failed, xml_files.len());
    }
    info!("All {} CIX files generated", xml_files.len());
    Ok(())
}

fn run_single(
    config: &GenerationConfig,
    request: &SelectionRequest,
    cli: &Cli,
) -> Result<()> {
    let xml_path = &config.tool_xml_file;
    let xml = std::fs::read_to_string(xml_path)
        .with_context(|| format!("XML file not found: {}", xml_path.display()))?;
    let inventory = ToolInventory::load(&xml)
        .with_context(|| format!("Error parsing XML file {}", xml_path.display()))?;

    if cli.summary {
        println!("Tool summary from {}:", xml_path.display());
        println!("{}", "-".repeat(50));
        for line in inventory.summary() {
            println!("{}", line);
        }
        println!();
    }

    let generator = DrillTestGenerator::new(config.clone(), inventory);

    if cli.dry_run {
        let plan = generator.plan(request)?;
        report(&plan.diagnostics);
        if !plan.is_emittable() {
            bail!("Drill test for {} would be refused", xml_path.display());
        }
        info!(
            "Dry run: {} drills across {} diameters, {} panel slots",
            plan.drill_count(),
            plan.groups.len(),
            plan.placements.len()
        );
        return Ok(());
    }

    let output = match generator.generate(request) {
        Ok(output) => output,
        Err(DrillTestError::Validation(failure)) => {
            report(failure.diagnostics());
            bail!("Drill test for {} has fatal problems", xml_path.display());
        }
        Err(err) => return Err(err.into()),
    };
    report(&output.advisories);

    let path = config.output_filename();
    std::fs::write(&path, &output.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "CIX drill test generated: {} ({} drills, {} labels, {} lines)",
        path.display(),
        output.drill_blocks,
        output.engraving_blocks,
        output.content.lines().count()
    );
    Ok(())
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_fatal() {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }
}
