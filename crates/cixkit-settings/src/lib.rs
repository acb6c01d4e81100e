//! CixKit Settings Crate
//!
//! Loads and saves drill-test settings files and freezes them into the
//! generation config used by the CAM tools.

pub mod config;
pub mod error;

pub use config::{
    DepthLimitSettings, DrillTestSettings, GroupSettings, LayoutSettings, MachiningSettings,
    NamingSettings, PanelSettings, SelectionMode, SelectionSettings,
};
pub use error::{SettingsError, SettingsResult};
