/// Simulator configuration
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vixen_controls::ControllerConfig;
use vixen_core::headless::FullscreenFlavor;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "vixen-sim.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub platform: PlatformSettings,

    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformSettings {
    /// Fullscreen API spelling the simulated platform exposes
    #[serde(default)]
    pub fullscreen: FullscreenFlavor,

    /// Start with a remembered volume in the preference store
    #[serde(default)]
    pub remembered_volume: Option<f64>,

    /// Give the controller a preference store at all
    #[serde(default = "default_true")]
    pub persistence: bool,
}

/// Geometry assigned to the surface so the layout pass has something to measure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutSettings {
    #[serde(default = "default_toolbar_width")]
    pub toolbar_width: f64,

    #[serde(default = "default_control_height")]
    pub control_height: f64,

    #[serde(default = "default_button_width")]
    pub button_width: f64,

    #[serde(default = "default_label_width")]
    pub label_width: f64,

    #[serde(default = "default_volume_width")]
    pub volume_width: f64,
}

impl SimConfig {
    /// Load from `path` (or `vixen-sim.toml` if present) and `VIXEN_` variables
    ///
    /// Nested keys use a double underscore: `VIXEN_CONTROLLER__SKIP_MIN_SECS=10`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SimError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VIXEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        if let Some(volume) = self.platform.remembered_volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(SimError::Config(format!(
                    "platform.remembered_volume out of range: {}",
                    volume
                )));
            }
        }
        Ok(())
    }
}

// Default values
fn default_true() -> bool {
    true
}

fn default_toolbar_width() -> f64 {
    800.0
}

fn default_control_height() -> f64 {
    32.0
}

fn default_button_width() -> f64 {
    40.0
}

fn default_label_width() -> f64 {
    60.0
}

fn default_volume_width() -> f64 {
    80.0
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            fullscreen: FullscreenFlavor::default(),
            remembered_volume: None,
            persistence: default_true(),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            toolbar_width: default_toolbar_width(),
            control_height: default_control_height(),
            button_width: default_button_width(),
            label_width: default_label_width(),
            volume_width: default_volume_width(),
        }
    }
}
