//! Dynamics model resolver
//!
//! Produces the single-degree-of-freedom modal model of the tool/holder
//! system. Values come from measured modal data when available and from a
//! stickout heuristic otherwise, merged field by field.

use chatterkit_core::{ensure_positive, ModalOverride, ParameterError, ToolGeometry};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Single-degree-of-freedom modal parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsModel {
    /// Natural frequency f_n in Hz
    pub natural_frequency: f64,
    /// Damping ratio ζ (dimensionless)
    pub damping_ratio: f64,
    /// Modal stiffness k in N/mm
    pub modal_stiffness: f64,
}

impl DynamicsModel {
    /// Create a model from measured values
    pub fn new(natural_frequency: f64, damping_ratio: f64, modal_stiffness: f64) -> Self {
        Self {
            natural_frequency,
            damping_ratio,
            modal_stiffness,
        }
    }

    /// Angular natural frequency ω_n = 2π f_n in rad/s
    #[inline]
    pub fn angular_natural_frequency(&self) -> f64 {
        2.0 * PI * self.natural_frequency
    }

    /// Reject models the chatter equations cannot use
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("natural_frequency", self.natural_frequency)?;
        ensure_positive("modal_stiffness", self.modal_stiffness)?;
        if !(self.damping_ratio > 0.0 && self.damping_ratio < 1.0) {
            return Err(ParameterError::OutOfRange {
                name: "damping_ratio".to_string(),
                value: self.damping_ratio,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Coefficients of the stickout heuristic
///
/// `f_n = base_frequency / (1 + stickout / frequency_stickout_scale)`,
/// `k = base_stiffness / (1 + stickout / stiffness_stickout_scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalDefaults {
    /// Natural frequency of a zero-stickout tool in Hz
    pub base_frequency: f64,
    /// Stickout in mm that halves the natural frequency
    pub frequency_stickout_scale: f64,
    /// Damping ratio assumed when none is measured
    pub damping_ratio: f64,
    /// Stiffness of a zero-stickout tool
    pub base_stiffness: f64,
    /// Stickout in mm that halves the stiffness
    pub stiffness_stickout_scale: f64,
}

impl Default for ModalDefaults {
    fn default() -> Self {
        Self {
            base_frequency: 3000.0,
            frequency_stickout_scale: 30.0,
            damping_ratio: 0.03,
            base_stiffness: 5e7,
            stiffness_stickout_scale: 50.0,
        }
    }
}

impl ModalDefaults {
    /// Model derived from geometry alone
    pub fn from_geometry(&self, tool: &ToolGeometry) -> DynamicsModel {
        DynamicsModel {
            natural_frequency: self.base_frequency
                / (1.0 + tool.stickout / self.frequency_stickout_scale),
            damping_ratio: self.damping_ratio,
            modal_stiffness: self.base_stiffness
                / (1.0 + tool.stickout / self.stiffness_stickout_scale),
        }
    }

    /// Geometry model with measured values taking precedence field by field
    pub fn resolve(&self, tool: &ToolGeometry, measured: &ModalOverride) -> DynamicsModel {
        let derived = self.from_geometry(tool);
        DynamicsModel {
            natural_frequency: measured
                .natural_frequency
                .unwrap_or(derived.natural_frequency),
            damping_ratio: measured.damping_ratio.unwrap_or(derived.damping_ratio),
            modal_stiffness: measured.modal_stiffness.unwrap_or(derived.modal_stiffness),
        }
    }

    /// Reject coefficients that would produce a degenerate model
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("base_frequency", self.base_frequency)?;
        ensure_positive("frequency_stickout_scale", self.frequency_stickout_scale)?;
        ensure_positive("base_stiffness", self.base_stiffness)?;
        ensure_positive("stiffness_stickout_scale", self.stiffness_stickout_scale)?;
        DynamicsModel::new(1.0, self.damping_ratio, 1.0).validate()
    }
}

/// Resolve a model with the default heuristic coefficients
pub fn resolve(tool: &ToolGeometry, measured: &ModalOverride) -> DynamicsModel {
    ModalDefaults::default().resolve(tool, measured)
}
