//! Machine profile data
//!
//! Spindle limits and optional measured modal parameters, as supplied by a
//! machine-profile database.

use crate::error::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};

/// Measured modal parameters
///
/// Each field, when present, replaces the value the resolver would derive
/// from tool geometry. A tap test usually yields all three, but a frequency
/// alone is common.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalOverride {
    /// Natural frequency in Hz
    pub natural_frequency: Option<f64>,
    /// Damping ratio (dimensionless)
    pub damping_ratio: Option<f64>,
    /// Modal stiffness in N/mm
    pub modal_stiffness: Option<f64>,
}

impl ModalOverride {
    /// Override with a measured natural frequency only
    pub fn natural_frequency(hz: f64) -> Self {
        Self {
            natural_frequency: Some(hz),
            ..Default::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.natural_frequency.is_none()
            && self.damping_ratio.is_none()
            && self.modal_stiffness.is_none()
    }

    /// Reject measured values the model cannot use
    pub fn validate(&self) -> Result<(), ParameterError> {
        if let Some(fn_hz) = self.natural_frequency {
            ensure_positive("natural_frequency", fn_hz)?;
        }
        if let Some(k) = self.modal_stiffness {
            ensure_positive("modal_stiffness", k)?;
        }
        if let Some(zeta) = self.damping_ratio {
            if !(zeta > 0.0 && zeta < 1.0) {
                return Err(ParameterError::OutOfRange {
                    name: "damping_ratio".to_string(),
                    value: zeta,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        Ok(())
    }
}

/// Spindle limits of a machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineLimits {
    /// Maximum spindle speed in rev/min
    pub max_rpm: f64,
    /// Maximum spindle power in kW
    pub max_power: f64,
    /// Maximum spindle torque in N·m
    pub max_torque: f64,
    /// Measured modal parameters, if the machine has been tap tested
    #[serde(default)]
    pub modal: ModalOverride,
}

impl MachineLimits {
    /// Limits without modal data
    pub fn new(max_rpm: f64, max_power: f64, max_torque: f64) -> Self {
        Self {
            max_rpm,
            max_power,
            max_torque,
            modal: ModalOverride::default(),
        }
    }

    /// Attach measured modal parameters
    pub fn with_modal(mut self, modal: ModalOverride) -> Self {
        self.modal = modal;
        self
    }

    /// True when any dynamics parameter is known for this machine
    pub fn has_dynamics(&self) -> bool {
        !self.modal.is_empty()
    }

    /// Reject limits that cannot be checked against
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("max_rpm", self.max_rpm)?;
        ensure_positive("max_power", self.max_power)?;
        ensure_positive("max_torque", self.max_torque)?;
        self.modal.validate()
    }
}

impl Default for MachineLimits {
    /// A mid-size VMC: 12k spindle, 15 kW, 80 N·m
    fn default() -> Self {
        Self::new(12000.0, 15.0, 80.0)
    }
}
