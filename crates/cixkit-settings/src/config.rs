//! Drill-test settings files
//!
//! A settings file describes one drill test: where the tooling XML lives,
//! where the CIX program goes, and the layout, machining, panel, naming and
//! selection sections. JSON and TOML are both accepted, chosen by the file
//! extension. Every field defaults, so a file only needs what it changes.
//!
//! Settings are a loose, serializable surface; [`DrillTestSettings::freeze`]
//! turns them into the validated [`GenerationConfig`] and
//! [`SelectionRequest`] used by the generator.

use crate::error::{SettingsError, SettingsResult};
use cixkit_core::{
    ConfigError, CustomSelection, Diameter, GenerationConfig, PanelSize, SelectionRequest,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Grid placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// X of the first grid slot (mm)
    pub start_x: f64,
    /// Y of the first grid slot (mm)
    pub start_y: f64,
    /// Column pitch (mm)
    pub spacing_x: f64,
    /// Row pitch (mm)
    pub spacing_y: f64,
    /// Smallest safe pitch (mm)
    pub min_spacing: f64,
    /// Columns per row before wrapping
    pub max_tools_per_row: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let defaults = GenerationConfig::default();
        Self {
            start_x: defaults.start_x,
            start_y: defaults.start_y,
            spacing_x: defaults.spacing_x,
            spacing_y: defaults.spacing_y,
            min_spacing: defaults.min_spacing,
            max_tools_per_row: defaults.max_tools_per_row,
        }
    }
}

/// Drilling and engraving settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachiningSettings {
    /// Drilling depth (mm)
    pub drill_depth: f64,
    /// Global depth ceiling (mm)
    pub max_depth: f64,
    /// Drilling RPM, 0 for the machine default
    pub drill_speed: u32,
    /// Engraving tool name
    pub engraving_tool: String,
    /// Engraving depth (mm)
    pub engraving_depth: f64,
    /// Tolerance for matching diameters against the tooling XML (mm)
    pub diameter_tolerance: f64,
}

impl Default for MachiningSettings {
    fn default() -> Self {
        let defaults = GenerationConfig::default();
        Self {
            drill_depth: defaults.drill_depth,
            max_depth: defaults.max_depth,
            drill_speed: defaults.drill_speed,
            engraving_tool: defaults.engraving_tool,
            engraving_depth: defaults.engraving_depth,
            diameter_tolerance: defaults.diameter_tolerance,
        }
    }
}

/// Panel (sheet) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Panel thickness (mm)
    pub thickness: f64,
    /// Fit the panel to the layout
    pub auto_size: bool,
    /// Margin around the layout when auto sizing (mm)
    pub margin: f64,
    /// Manual panel width (mm)
    pub width: f64,
    /// Manual panel height (mm)
    pub height: f64,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            thickness: GenerationConfig::default().panel_thickness,
            auto_size: true,
            margin: 5.0,
            width: 438.0,
            height: 640.0,
        }
    }
}

impl PanelSettings {
    fn panel_size(&self) -> PanelSize {
        if self.auto_size {
            PanelSize::Auto {
                margin: self.margin,
            }
        } else {
            PanelSize::Manual {
                width: self.width,
                height: self.height,
            }
        }
    }
}

/// Output file naming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Append a date stamp to the output file name
    pub auto_timestamp: bool,
    /// `strftime` format of the stamp
    pub timestamp_format: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        let defaults = GenerationConfig::default();
        Self {
            auto_timestamp: defaults.auto_timestamp,
            timestamp_format: defaults.timestamp_format,
        }
    }
}

/// Which tools the test exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Every spindle in the tooling XML
    #[default]
    All,
    /// The listed diameter groups only
    Custom,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// One custom diameter group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Tool diameter (mm)
    pub diameter: f64,
    /// Spindles in drilling order
    pub spindles: Vec<u32>,
}

/// Tool selection settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub mode: SelectionMode,
    pub groups: Vec<GroupSettings>,
}

impl SelectionSettings {
    /// Build the selection request; custom groups keep their file order
    pub fn to_request(&self) -> Result<SelectionRequest, ConfigError> {
        match self.mode {
            SelectionMode::All => Ok(SelectionRequest::AllTools),
            SelectionMode::Custom => {
                let selection = CustomSelection::from_pairs(
                    self.groups
                        .iter()
                        .map(|group| (group.diameter, group.spindles.iter().copied())),
                )?;
                Ok(SelectionRequest::Custom(selection))
            }
        }
    }
}

/// Depth cap for one diameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLimitSettings {
    /// Tool diameter (mm)
    pub diameter: f64,
    /// Deepest allowed plunge (mm)
    pub max_depth: f64,
}

/// Complete drill-test settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillTestSettings {
    /// Spindle tooling XML
    pub tool_xml_file: PathBuf,
    /// CIX program to write
    pub output_file: PathBuf,
    pub layout: LayoutSettings,
    pub machining: MachiningSettings,
    pub panel: PanelSettings,
    pub naming: NamingSettings,
    pub selection: SelectionSettings,
    pub depth_limits: Vec<DepthLimitSettings>,
}

impl Default for DrillTestSettings {
    fn default() -> Self {
        let defaults = GenerationConfig::default();
        Self {
            tool_xml_file: defaults.tool_xml_file,
            output_file: defaults.output_file,
            layout: LayoutSettings::default(),
            machining: MachiningSettings::default(),
            panel: PanelSettings::default(),
            naming: NamingSettings::default(),
            selection: SelectionSettings::default(),
            depth_limits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
        _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
    }
}

impl DrillTestSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        info!("Loaded drill-test settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;

        debug!("Saved drill-test settings to {}", path.display());
        Ok(())
    }

    /// Check that the settings freeze into a valid config and selection
    pub fn validate(&self) -> SettingsResult<()> {
        self.freeze().map(|_| ())
    }

    /// Frozen generation config
    pub fn generation_config(&self) -> Result<GenerationConfig, ConfigError> {
        let mut builder = GenerationConfig::builder()
            .tool_xml_file(self.tool_xml_file.clone())
            .output_file(self.output_file.clone())
            .start(self.layout.start_x, self.layout.start_y)
            .spacing(self.layout.spacing_x, self.layout.spacing_y)
            .min_spacing(self.layout.min_spacing)
            .max_tools_per_row(self.layout.max_tools_per_row)
            .drill_depth(self.machining.drill_depth)
            .max_depth(self.machining.max_depth)
            .drill_speed(self.machining.drill_speed)
            .engraving_tool(self.machining.engraving_tool.as_str())
            .engraving_depth(self.machining.engraving_depth)
            .diameter_tolerance(self.machining.diameter_tolerance)
            .panel_thickness(self.panel.thickness)
            .panel_size(self.panel.panel_size())
            .file_naming(self.naming.auto_timestamp, self.naming.timestamp_format.as_str());

        for limit in &self.depth_limits {
            builder = builder.depth_limit(Diameter::new(limit.diameter)?, limit.max_depth);
        }

        builder.build()
    }

    /// Frozen generation config and selection request
    pub fn freeze(&self) -> SettingsResult<(GenerationConfig, SelectionRequest)> {
        let config = self.generation_config()?;
        let request = self.selection.to_request()?;
        Ok((config, request))
    }
}
