//! Generation config and tool selection
//!
//! A [`GenerationConfig`] is accumulated through [`GenerationConfigBuilder`],
//! checked once in [`GenerationConfigBuilder::build`], and then passed by
//! reference through every generation stage. Structural problems (non-finite
//! numbers, empty file names, out-of-range machining values) are rejected
//! here; domain thresholds such as spacing against `min_spacing` are left to
//! the validator so they are all reported together.

use crate::error::ConfigError;
use crate::units::{format_mm, Diameter, SpindleId, DEFAULT_DIAMETER_TOLERANCE};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Tolerance used when matching a per-diameter depth limit (mm)
pub const DEPTH_LIMIT_TOLERANCE: f64 = 0.1;

/// Accepted spindle speed range for drilling when one is set (RPM)
pub const DRILL_SPEED_RANGE: (u32, u32) = (1000, 24000);

/// Accepted engraving depth range (mm)
pub const ENGRAVING_DEPTH_RANGE: (f64, f64) = (0.1, 2.0);

/// Largest plausible panel thickness (mm)
pub const MAX_PANEL_THICKNESS: f64 = 1000.0;

/// How the panel (sheet) dimensions are chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelSize {
    /// Fit the panel to the laid-out test plus a margin on every side
    Auto {
        /// Margin around the layout (mm)
        margin: f64,
    },
    /// Fixed panel dimensions
    Manual {
        /// Panel width, LPX (mm)
        width: f64,
        /// Panel height, LPY (mm)
        height: f64,
    },
}

impl Default for PanelSize {
    fn default() -> Self {
        Self::Auto { margin: 5.0 }
    }
}

/// Maximum drilling depth for one tool diameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLimit {
    /// Tool diameter the limit applies to
    pub diameter: Diameter,
    /// Deepest allowed plunge for that diameter (mm)
    pub max_depth: f64,
}

/// Frozen generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// X of the first grid slot (mm)
    pub start_x: f64,
    /// Y of the first grid slot (mm)
    pub start_y: f64,
    /// Column pitch (mm)
    pub spacing_x: f64,
    /// Row pitch (mm)
    pub spacing_y: f64,
    /// Drilling depth (mm)
    pub drill_depth: f64,
    /// Smallest pitch considered safe between holes (mm)
    pub min_spacing: f64,
    /// Grid columns per row before wrapping
    pub max_tools_per_row: usize,
    /// CIX file to write
    pub output_file: PathBuf,
    /// Spindle tooling XML to read
    pub tool_xml_file: PathBuf,
    /// Tolerance when checking requested diameters against the inventory (mm)
    pub diameter_tolerance: f64,
    /// Global drilling depth ceiling (mm)
    pub max_depth: f64,
    /// Per-diameter depth caps
    pub depth_limits: Vec<DepthLimit>,
    /// Panel thickness, LPZ (mm)
    pub panel_thickness: f64,
    /// Panel dimensions policy
    pub panel_size: PanelSize,
    /// Engraving tool name for label routing
    pub engraving_tool: String,
    /// Engraving depth for labels (mm)
    pub engraving_depth: f64,
    /// Drilling spindle speed, 0 for the machine default (RPM)
    pub drill_speed: u32,
    /// Append a date stamp to the output file name
    pub auto_timestamp: bool,
    /// `strftime` format of the date stamp
    pub timestamp_format: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            spacing_x: 32.0,
            spacing_y: 50.0,
            drill_depth: 19.0,
            min_spacing: 20.0,
            max_tools_per_row: 99,
            output_file: PathBuf::from("R2_Drill_Test.cix"),
            tool_xml_file: PathBuf::from("r2_spindle_tooling.xml"),
            diameter_tolerance: DEFAULT_DIAMETER_TOLERANCE,
            max_depth: 20.0,
            depth_limits: Vec::new(),
            panel_thickness: 19.0,
            panel_size: PanelSize::default(),
            engraving_tool: "V45D22MM".to_string(),
            engraving_depth: 0.5,
            drill_speed: 0,
            auto_timestamp: true,
            timestamp_format: "%m_%d_%Y".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Start a builder seeded with the defaults
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    /// Drilling depth for a tool diameter, honouring per-diameter limits
    pub fn effective_drill_depth(&self, diameter: Diameter) -> f64 {
        self.depth_limits
            .iter()
            .find(|limit| limit.diameter.matches(diameter, DEPTH_LIMIT_TOLERANCE))
            .map_or(self.drill_depth, |limit| self.drill_depth.min(limit.max_depth))
    }

    /// Output file name, date-stamped for `date` when enabled
    ///
    /// `R2_Drill_Test.cix` becomes `R2_Drill_Test_10_19_2026.cix`.
    pub fn output_filename_on(&self, date: NaiveDate) -> PathBuf {
        if !self.auto_timestamp {
            return self.output_file.clone();
        }

        let mut stamp = String::new();
        if write!(stamp, "{}", date.format(&self.timestamp_format)).is_err() {
            return self.output_file.clone();
        }

        let stem = self
            .output_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match self.output_file.extension() {
            Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
            None => format!("{}_{}", stem, stamp),
        };
        self.output_file.with_file_name(name)
    }

    /// Output file name, date-stamped with today's local date when enabled
    pub fn output_filename(&self) -> PathBuf {
        self.output_filename_on(chrono::Local::now().date_naive())
    }
}

/// Accumulates generation settings before freezing them
#[derive(Debug, Clone, Default)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    /// Position of the first grid slot
    pub fn start(mut self, x: f64, y: f64) -> Self {
        self.config.start_x = x;
        self.config.start_y = y;
        self
    }

    /// Column and row pitch
    pub fn spacing(mut self, x: f64, y: f64) -> Self {
        self.config.spacing_x = x;
        self.config.spacing_y = y;
        self
    }

    /// Drilling depth
    pub fn drill_depth(mut self, depth: f64) -> Self {
        self.config.drill_depth = depth;
        self
    }

    /// Smallest safe pitch
    pub fn min_spacing(mut self, spacing: f64) -> Self {
        self.config.min_spacing = spacing;
        self
    }

    /// Grid columns per row
    pub fn max_tools_per_row(mut self, count: usize) -> Self {
        self.config.max_tools_per_row = count;
        self
    }

    /// CIX output path
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = path.into();
        self
    }

    /// Tooling XML path
    pub fn tool_xml_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tool_xml_file = path.into();
        self
    }

    /// Diameter matching tolerance
    pub fn diameter_tolerance(mut self, tolerance: f64) -> Self {
        self.config.diameter_tolerance = tolerance;
        self
    }

    /// Global depth ceiling
    pub fn max_depth(mut self, depth: f64) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Cap the depth for one diameter, replacing an existing cap for it
    pub fn depth_limit(mut self, diameter: Diameter, max_depth: f64) -> Self {
        self.config
            .depth_limits
            .retain(|limit| !limit.diameter.matches(diameter, DEPTH_LIMIT_TOLERANCE));
        self.config.depth_limits.push(DepthLimit {
            diameter,
            max_depth,
        });
        self
    }

    /// Remove the depth cap for one diameter
    pub fn clear_depth_limit(mut self, diameter: Diameter) -> Self {
        self.config
            .depth_limits
            .retain(|limit| !limit.diameter.matches(diameter, DEPTH_LIMIT_TOLERANCE));
        self
    }

    /// Panel thickness (LPZ)
    pub fn panel_thickness(mut self, thickness: f64) -> Self {
        self.config.panel_thickness = thickness;
        self
    }

    /// Panel dimensions policy
    pub fn panel_size(mut self, size: PanelSize) -> Self {
        self.config.panel_size = size;
        self
    }

    /// Engraving tool name
    pub fn engraving_tool(mut self, name: impl Into<String>) -> Self {
        self.config.engraving_tool = name.into();
        self
    }

    /// Engraving depth
    pub fn engraving_depth(mut self, depth: f64) -> Self {
        self.config.engraving_depth = depth;
        self
    }

    /// Drilling spindle speed (0 = machine default)
    pub fn drill_speed(mut self, rpm: u32) -> Self {
        self.config.drill_speed = rpm;
        self
    }

    /// Output file date stamping
    pub fn file_naming(mut self, auto_timestamp: bool, format: impl Into<String>) -> Self {
        self.config.auto_timestamp = auto_timestamp;
        self.config.timestamp_format = format.into();
        self
    }

    /// Validate and freeze the config
    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let config = self.config;

        for (name, value) in [
            ("drill_depth", config.drill_depth),
            ("min_spacing", config.min_spacing),
            ("diameter_tolerance", config.diameter_tolerance),
            ("max_depth", config.max_depth),
        ] {
            require_finite(name, value)?;
        }

        for (name, value) in [
            ("spacing_x", config.spacing_x),
            ("spacing_y", config.spacing_y),
            ("panel_thickness", config.panel_thickness),
        ] {
            require_positive(name, value)?;
        }

        for (name, value) in [
            ("start_x", config.start_x),
            ("start_y", config.start_y),
            ("min_spacing", config.min_spacing),
        ] {
            require_non_negative(name, value)?;
        }
        if config.diameter_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "diameter_tolerance",
                "must not be negative",
            ));
        }
        if config.max_tools_per_row == 0 {
            return Err(ConfigError::invalid(
                "max_tools_per_row",
                "must be at least 1",
            ));
        }
        require_path("output_file", &config.output_file)?;
        require_path("tool_xml_file", &config.tool_xml_file)?;

        if config.panel_thickness > MAX_PANEL_THICKNESS {
            return Err(ConfigError::OutOfRange {
                name: "panel_thickness".to_string(),
                value: config.panel_thickness,
                min: 0.0,
                max: MAX_PANEL_THICKNESS,
            });
        }
        match config.panel_size {
            PanelSize::Auto { margin } => {
                require_finite("panel_margin", margin)?;
                if margin < 0.0 {
                    return Err(ConfigError::invalid("panel_margin", "must not be negative"));
                }
            }
            PanelSize::Manual { width, height } => {
                require_positive("panel_width", width)?;
                require_positive("panel_height", height)?;
            }
        }

        for limit in &config.depth_limits {
            require_positive(
                &format!("depth_limit[{}mm]", format_mm(limit.diameter.mm())),
                limit.max_depth,
            )?;
        }

        let mut config = config;
        config.engraving_tool = config.engraving_tool.trim().to_string();
        if config.engraving_tool.is_empty() {
            return Err(ConfigError::invalid("engraving_tool", "must not be empty"));
        }
        let (min_engrave, max_engrave) = ENGRAVING_DEPTH_RANGE;
        if !(min_engrave..=max_engrave).contains(&config.engraving_depth) {
            return Err(ConfigError::OutOfRange {
                name: "engraving_depth".to_string(),
                value: config.engraving_depth,
                min: min_engrave,
                max: max_engrave,
            });
        }

        let (min_rpm, max_rpm) = DRILL_SPEED_RANGE;
        if config.drill_speed != 0 && !(min_rpm..=max_rpm).contains(&config.drill_speed) {
            return Err(ConfigError::OutOfRange {
                name: "drill_speed".to_string(),
                value: f64::from(config.drill_speed),
                min: f64::from(min_rpm),
                max: f64::from(max_rpm),
            });
        }

        if StrftimeItems::new(&config.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::invalid(
                "timestamp_format",
                format!("unsupported strftime format {:?}", config.timestamp_format),
            ));
        }

        Ok(config)
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, "must be a finite number"))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    require_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must not be negative, got {}", value)))
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must be positive, got {}", value)))
    }
}

fn require_path(name: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        Err(ConfigError::invalid(name, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Explicit diameter → spindle list selection
///
/// Entries keep the caller's order; spindle lists are never re-sorted
/// because their order is the drilling order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomSelection {
    entries: Vec<(Diameter, Vec<SpindleId>)>,
}

impl CustomSelection {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diameter entry (builder style)
    pub fn with(mut self, diameter: Diameter, spindles: Vec<SpindleId>) -> Self {
        self.push(diameter, spindles);
        self
    }

    /// Add a diameter entry
    pub fn push(&mut self, diameter: Diameter, spindles: Vec<SpindleId>) {
        self.entries.push((diameter, spindles));
    }

    /// Build from raw millimetre / spindle number pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (f64, S)>,
        S: IntoIterator<Item = u32>,
    {
        let mut selection = Self::new();
        for (mm, spindles) in pairs {
            let diameter = Diameter::new(mm)?;
            let spindles = spindles
                .into_iter()
                .map(SpindleId::new)
                .collect::<Result<Vec<_>, _>>()?;
            selection.push(diameter, spindles);
        }
        Ok(selection)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[(Diameter, Vec<SpindleId>)] {
        &self.entries
    }

    /// Number of diameter entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no diameters were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which spindles a drill test exercises
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionRequest {
    /// Every spindle in the tooling inventory
    #[default]
    AllTools,
    /// Explicit diameter → spindle lists
    Custom(CustomSelection),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let config = GenerationConfig::builder().build().unwrap();
        assert_eq!(config, GenerationConfig::default());
        assert_eq!(config.max_tools_per_row, 99);
        assert_eq!(config.diameter_tolerance, 0.01);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = GenerationConfig::builder()
            .start(50.0, 100.0)
            .spacing(40.0, 60.0)
            .drill_depth(15.0)
            .max_tools_per_row(10)
            .output_file("custom_drill_test.cix")
            .engraving_tool("  v90d3mm ")
            .build()
            .unwrap();
        assert_eq!((config.start_x, config.start_y), (50.0, 100.0));
        assert_eq!((config.spacing_x, config.spacing_y), (40.0, 60.0));
        assert_eq!(config.drill_depth, 15.0);
        assert_eq!(config.max_tools_per_row, 10);
        assert_eq!(config.engraving_tool, "v90d3mm");
    }

    #[test]
    fn test_build_rejects_structural_problems() {
        assert!(GenerationConfig::builder().max_tools_per_row(0).build().is_err());
        assert!(GenerationConfig::builder().spacing(0.0, 50.0).build().is_err());
        assert!(GenerationConfig::builder().start(f64::NAN, 0.0).build().is_err());
        assert!(GenerationConfig::builder().start(0.0, 0.0).build().is_ok());
        assert!(GenerationConfig::builder().output_file("").build().is_err());
        assert!(GenerationConfig::builder().engraving_tool(" ").build().is_err());
        assert!(GenerationConfig::builder().panel_thickness(0.0).build().is_err());
        assert!(GenerationConfig::builder().panel_thickness(2000.0).build().is_err());
        assert!(GenerationConfig::builder()
            .panel_size(PanelSize::Manual {
                width: 0.0,
                height: 10.0
            })
            .build()
            .is_err());
        assert!(matches!(
            GenerationConfig::builder().engraving_depth(3.0).build(),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            GenerationConfig::builder().drill_speed(500).build(),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(GenerationConfig::builder().drill_speed(18000).build().is_ok());
        assert!(GenerationConfig::builder()
            .file_naming(true, "%Q")
            .build()
            .is_err());
    }

    #[test]
    fn test_build_rejects_negative_start() {
        assert_eq!(
            GenerationConfig::builder().start(-10.0, 0.0).build(),
            Err(ConfigError::InvalidValue {
                name: "start_x".to_string(),
                reason: "must not be negative, got -10".to_string(),
            })
        );
        assert!(matches!(
            GenerationConfig::builder().start(5.0, -0.5).build(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "start_y"
        ));
    }

    #[test]
    fn test_build_leaves_domain_thresholds_to_validation() {
        // Spacing under the minimum and a non-positive depth are reported by
        // the validator, not rejected here.
        let config = GenerationConfig::builder()
            .spacing(10.0, 10.0)
            .drill_depth(0.0)
            .build()
            .unwrap();
        assert_eq!(config.spacing_x, 10.0);
        assert_eq!(config.drill_depth, 0.0);
    }

    #[test]
    fn test_effective_drill_depth() {
        let two = Diameter::new(2.0).unwrap();
        let config = GenerationConfig::builder()
            .drill_depth(15.0)
            .depth_limit(two, 2.0)
            .build()
            .unwrap();
        assert_eq!(config.effective_drill_depth(two), 2.0);
        assert_eq!(config.effective_drill_depth(Diameter::new(2.05).unwrap()), 2.0);
        assert_eq!(config.effective_drill_depth(Diameter::new(5.0).unwrap()), 15.0);

        let config = GenerationConfig::builder()
            .drill_depth(1.5)
            .depth_limit(two, 2.0)
            .build()
            .unwrap();
        assert_eq!(config.effective_drill_depth(two), 1.5);
    }

    #[test]
    fn test_depth_limit_replace_and_clear() {
        let two = Diameter::new(2.0).unwrap();
        let builder = GenerationConfig::builder()
            .depth_limit(two, 2.0)
            .depth_limit(two, 3.0);
        let config = builder.clone().build().unwrap();
        assert_eq!(config.depth_limits.len(), 1);
        assert_eq!(config.depth_limits[0].max_depth, 3.0);

        let config = builder.clear_depth_limit(two).build().unwrap();
        assert!(config.depth_limits.is_empty());
    }

    #[test]
    fn test_output_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let config = GenerationConfig::default();
        assert_eq!(
            config.output_filename_on(date),
            PathBuf::from("R2_Drill_Test_10_19_2026.cix")
        );

        let config = GenerationConfig::builder()
            .output_file("out/test")
            .file_naming(true, "%Y%m%d")
            .build()
            .unwrap();
        assert_eq!(
            config.output_filename_on(date),
            PathBuf::from("out/test_20261019")
        );

        let config = GenerationConfig::builder()
            .file_naming(false, "%m_%d_%Y")
            .build()
            .unwrap();
        assert_eq!(
            config.output_filename_on(date),
            PathBuf::from("R2_Drill_Test.cix")
        );
    }

    #[test]
    fn test_custom_selection_from_pairs() {
        let selection = CustomSelection::from_pairs(vec![(5.0, vec![9, 7, 8]), (8.0, vec![10])])
            .unwrap();
        assert_eq!(selection.len(), 2);
        let ids: Vec<u32> = selection.entries()[0].1.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![9, 7, 8]);

        assert!(CustomSelection::from_pairs(vec![(0.0, vec![1])]).is_err());
        assert!(CustomSelection::from_pairs(vec![(5.0, vec![0])]).is_err());
    }
}
