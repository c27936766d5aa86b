//! ChatterKit Settings Crate
//!
//! Handles loading, validating and persisting the advisor's tuning
//! parameters and default tool/machine profiles.

pub mod config;

pub use config::{config_dir, default_config_path, Config, ToolDefaults};
