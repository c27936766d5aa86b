//! Data models supplied by collaborators
//!
//! Tool geometry, material coefficients, machine limits and the cutting
//! state under evaluation. These are plain values; nothing here is mutated by
//! the advisor.

pub mod machine;
pub mod materials;
pub mod tools;

use crate::error::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};

pub use machine::{MachineLimits, ModalOverride};
pub use materials::{MaterialClass, MaterialCuttingProperties};
pub use tools::{ToolGeometry, ToolOverrides};

/// The cutting condition under evaluation
///
/// Spindle speed may be given directly or implied from surface speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuttingState {
    /// Spindle speed in rev/min
    pub spindle_speed: Option<f64>,
    /// Surface speed Vc in m/min
    pub surface_speed: Option<f64>,
    /// Table feed rate in mm/min
    pub feed_rate: f64,
    /// Axial depth of cut a_p in mm
    pub axial_depth: f64,
    /// Radial engagement a_e in mm
    pub radial_depth: f64,
}

impl CuttingState {
    /// State at a fixed spindle speed
    pub fn at_rpm(spindle_speed: f64, feed_rate: f64, axial_depth: f64, radial_depth: f64) -> Self {
        Self {
            spindle_speed: Some(spindle_speed),
            surface_speed: None,
            feed_rate,
            axial_depth,
            radial_depth,
        }
    }

    /// State at a surface speed
    pub fn at_surface_speed(
        surface_speed: f64,
        feed_rate: f64,
        axial_depth: f64,
        radial_depth: f64,
    ) -> Self {
        Self {
            spindle_speed: None,
            surface_speed: Some(surface_speed),
            feed_rate,
            axial_depth,
            radial_depth,
        }
    }

    /// Reject states that cannot be evaluated
    pub fn validate(&self) -> Result<(), ParameterError> {
        match (self.spindle_speed, self.surface_speed) {
            (None, None) => {
                return Err(ParameterError::Missing(
                    "spindle_speed or surface_speed".to_string(),
                ))
            }
            (Some(rpm), _) => {
                ensure_positive("spindle_speed", rpm)?;
            }
            (None, Some(vc)) => {
                ensure_positive("surface_speed", vc)?;
            }
        }
        if let Some(vc) = self.surface_speed {
            ensure_positive("surface_speed", vc)?;
        }
        ensure_positive("axial_depth", self.axial_depth)?;
        if !(self.feed_rate.is_finite() && self.feed_rate >= 0.0) {
            return Err(ParameterError::invalid("feed_rate", "must be zero or positive"));
        }
        if !(self.radial_depth.is_finite() && self.radial_depth >= 0.0) {
            return Err(ParameterError::invalid("radial_depth", "must be zero or positive"));
        }
        Ok(())
    }
}
