//! Configuration and settings management for ChatterKit
//!
//! Provides configuration file handling and validation for the tuning
//! parameters of the stability advisor. Supports JSON and TOML file formats
//! stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Modal heuristics (geometry-derived natural frequency and stiffness)
//! - Stability settings (clamp band, pocket noise floor)
//! - Search window (stable-speed scan)
//! - Envelope settings (lobe tolerance, sweep resolution, power model)
//! - Default tool and machine profiles

use chatterkit_camtools::{EnvelopeSettings, EnvelopeValidator};
use chatterkit_core::data::tools::{DEFAULT_DIAMETER, DEFAULT_FLUTES, DEFAULT_STICKOUT_RATIO};
use chatterkit_core::{Error, MachineLimits, Result, ToolGeometry, ToolOverrides};
use chatterkit_dynamics::{ModalDefaults, SearchSettings, StabilityAnalyzer, StabilitySettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "chatterkit";
/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default tool profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    /// Cutting diameter in mm
    pub diameter: f64,
    /// Number of flutes
    pub flutes: u32,
    /// Stickout as a multiple of diameter
    pub stickout_ratio: f64,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_DIAMETER,
            flutes: DEFAULT_FLUTES,
            stickout_ratio: DEFAULT_STICKOUT_RATIO,
        }
    }
}

impl ToolDefaults {
    /// Geometry of the default profile
    pub fn geometry(&self) -> ToolGeometry {
        ToolGeometry::new(self.diameter, self.flutes, self.diameter * self.stickout_ratio)
    }

    /// Apply caller overrides over the default profile
    pub fn resolve(&self, overrides: &ToolOverrides) -> ToolGeometry {
        let mut tool = overrides.resolve_over(&self.geometry());
        if overrides.stickout.is_none() && overrides.diameter.is_some() {
            tool.stickout = tool.diameter * self.stickout_ratio;
        }
        tool
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geometry-derived modal heuristics
    pub modal: ModalDefaults,
    /// Clamp band and pocket noise floor
    pub stability: StabilitySettings,
    /// Stable-speed search window
    pub search: SearchSettings,
    /// Envelope validator settings
    pub envelope: EnvelopeSettings,
    /// Default tool profile
    pub tool: ToolDefaults,
    /// Default machine profile
    pub machine: MachineLimits,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::config("Config file must be .json or .toml"));
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::config("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    /// Load the file at `path`, or the platform default file if present,
    /// falling back to defaults when neither exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.modal.validate()?;
        self.stability.validate()?;
        self.search.validate()?;
        self.envelope.validate()?;
        self.machine.validate()?;
        self.tool.geometry().validate()?;
        if !(self.tool.stickout_ratio.is_finite() && self.tool.stickout_ratio > 0.0) {
            return Err(Error::config("Tool stickout ratio must be > 0"));
        }
        Ok(())
    }

    /// Merge another config into this one
    ///
    /// Sections of `other` that differ from the defaults replace the
    /// corresponding sections here.
    pub fn merge(&mut self, other: &Config) {
        let defaults = Config::default();
        if other.modal != defaults.modal {
            self.modal = other.modal;
        }
        if other.stability != defaults.stability {
            self.stability = other.stability;
        }
        if other.search != defaults.search {
            self.search = other.search;
        }
        if other.envelope != defaults.envelope {
            self.envelope = other.envelope;
        }
        if other.tool != defaults.tool {
            self.tool = other.tool;
        }
        if other.machine != defaults.machine {
            self.machine = other.machine;
        }
    }

    /// Stability analyzer built from these settings
    pub fn analyzer(&self) -> StabilityAnalyzer {
        StabilityAnalyzer::with_settings(self.modal, self.stability, self.search)
    }

    /// Envelope validator built from these settings
    pub fn envelope_validator(&self) -> EnvelopeValidator {
        EnvelopeValidator::with_settings(self.analyzer(), self.envelope)
    }
}

/// Platform config directory for ChatterKit
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

/// Platform default config file, `<config_dir>/chatterkit/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stability.pocket_noise_floor, 2.0);
        assert_eq!(config.envelope.lobe_tolerance_rpm, 100.0);
        assert_eq!(config.search.window_rpm, 2000.0);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let mut config = Config::default();
        config.stability.depth_limits.ceiling = 0.05;
        assert!(config.validate().unwrap_err().is_parameter_error());

        let mut config = Config::default();
        config.tool.stickout_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_takes_changed_sections() {
        let mut base = Config::default();
        base.machine = MachineLimits::new(8000.0, 5.5, 30.0);

        let mut overlay = Config::default();
        overlay.envelope.lobe_tolerance_rpm = 50.0;

        base.merge(&overlay);
        assert_eq!(base.envelope.lobe_tolerance_rpm, 50.0);
        // Untouched sections of the overlay do not reset the base
        assert_eq!(base.machine.max_rpm, 8000.0);
    }

    #[test]
    fn test_tool_defaults_resolve() {
        let defaults = ToolDefaults {
            diameter: 10.0,
            flutes: 3,
            stickout_ratio: 3.0,
        };
        let tool = defaults.resolve(&ToolOverrides::default());
        assert_eq!(tool, ToolGeometry::new(10.0, 3, 30.0));

        let tool = defaults.resolve(&ToolOverrides {
            diameter: Some(6.0),
            ..Default::default()
        });
        assert_eq!(tool, ToolGeometry::new(6.0, 3, 18.0));

        let tool = defaults.resolve(&ToolOverrides {
            diameter: Some(6.0),
            stickout: Some(40.0),
            ..Default::default()
        });
        assert_eq!(tool.stickout, 40.0);
    }

    #[test]
    fn test_analyzer_uses_settings() {
        let mut config = Config::default();
        config.stability.pocket_noise_floor = 5.0;
        config.envelope.sweep_points = 80;
        assert_eq!(config.analyzer().stability_settings().pocket_noise_floor, 5.0);
        assert_eq!(config.envelope_validator().settings().sweep_points, 80);
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("chatterkit/config.toml"));
        }
    }
}
