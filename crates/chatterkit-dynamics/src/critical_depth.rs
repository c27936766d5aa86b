//! Critical depth of cut
//!
//! Limiting axial depth for regenerative chatter of a single-mode system:
//!
//! ```text
//! ω_t   = 2π · n · z / 60
//! r     = ω_t / ω_n
//! G_re  = (1 − r²) / [(1 − r²)² + (2ζr)²]
//! b_lim = | k / (2 · K_c · z · |G_re + ε|) |
//! ```
//!
//! The result is clamped to a sanity band. A clamp hit means the inputs are
//! degenerate (near-zero damping, pathological stiffness, resonance crossing)
//! and the number should not be read as a precise limit.

use crate::modal::DynamicsModel;
use chatterkit_core::units::tooth_passing_angular_frequency;
use chatterkit_core::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};

/// Clamp band and resonance guard for the critical-depth primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthLimits {
    /// Smallest depth reported, in mm
    pub floor: f64,
    /// Largest depth reported, in mm. A sanity ceiling, not a physical constant.
    pub ceiling: f64,
    /// Offset added to G_re so resonance crossings stay finite
    pub resonance_epsilon: f64,
}

impl Default for DepthLimits {
    fn default() -> Self {
        Self {
            floor: 0.1,
            ceiling: 50.0,
            resonance_epsilon: 0.001,
        }
    }
}

impl DepthLimits {
    /// Reject an empty or inverted band
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("depth_limits.floor", self.floor)?;
        ensure_positive("depth_limits.resonance_epsilon", self.resonance_epsilon)?;
        if self.ceiling <= self.floor {
            return Err(ParameterError::InvalidRange {
                name: "depth_limits".to_string(),
                min: self.floor,
                max: self.ceiling,
            });
        }
        Ok(())
    }
}

/// A critical depth and whether it hit the clamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalDepth {
    /// Limiting axial depth in mm, inside the clamp band
    pub depth: f64,
    /// The raw value fell outside the clamp band
    pub low_confidence: bool,
}

/// Real part of the normalised frequency response at ratio `r`
#[inline]
pub fn frf_real(r: f64, damping_ratio: f64) -> f64 {
    let one_minus_r2 = 1.0 - r * r;
    let two_zeta_r = 2.0 * damping_ratio * r;
    one_minus_r2 / (one_minus_r2 * one_minus_r2 + two_zeta_r * two_zeta_r)
}

/// Critical depth with explicit limits
#[inline]
pub fn evaluate(
    speed_rpm: f64,
    dynamics: &DynamicsModel,
    specific_cutting_force: f64,
    flutes: u32,
    limits: &DepthLimits,
) -> CriticalDepth {
    let r = tooth_passing_angular_frequency(speed_rpm, flutes)
        / dynamics.angular_natural_frequency();
    let g_re = frf_real(r, dynamics.damping_ratio);
    let cutting_gain = 2.0 * specific_cutting_force * f64::from(flutes);
    let raw = (dynamics.modal_stiffness / (cutting_gain * (g_re + limits.resonance_epsilon).abs())).abs();

    CriticalDepth {
        depth: raw.clamp(limits.floor, limits.ceiling),
        low_confidence: !(raw >= limits.floor && raw <= limits.ceiling),
    }
}

/// Critical depth in mm with the default clamp band
#[inline]
pub fn critical_depth(
    speed_rpm: f64,
    dynamics: &DynamicsModel,
    specific_cutting_force: f64,
    flutes: u32,
) -> f64 {
    evaluate(
        speed_rpm,
        dynamics,
        specific_cutting_force,
        flutes,
        &DepthLimits::default(),
    )
    .depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn soft_mode() -> DynamicsModel {
        DynamicsModel::new(800.0, 0.03, 2.0e4)
    }

    #[test]
    fn test_frf_real_static_limit() {
        assert_relative_eq!(frf_real(0.0, 0.03), 1.0);
        // Zero crossing at resonance
        assert_relative_eq!(frf_real(1.0, 0.03), 0.0);
        // Negative above resonance
        assert!(frf_real(1.5, 0.03) < 0.0);
    }

    #[test]
    fn test_low_speed_depth() {
        // Far below resonance G_re ≈ 1, so b ≈ k / (2 Kc z) = 20000 / 16000
        let depth = critical_depth(60.0, &soft_mode(), 2000.0, 4);
        assert_relative_eq!(depth, 1.25 / 1.001, epsilon = 1e-3);
    }

    #[test]
    fn test_resonance_crossing_hits_ceiling() {
        // n = f_n · 60 / z puts the tooth-passing frequency on f_n
        let result = evaluate(12000.0, &soft_mode(), 2000.0, 4, &DepthLimits::default());
        assert_eq!(result.depth, 50.0);
        assert!(result.low_confidence);
    }

    #[test]
    fn test_stiff_geometry_model_saturates() {
        // The stickout heuristic is stiff enough that most speeds hit the ceiling
        let model = DynamicsModel::new(800.0, 0.03, 5e7);
        let result = evaluate(8000.0, &model, 2000.0, 4, &DepthLimits::default());
        assert_eq!(result.depth, 50.0);
        assert!(result.low_confidence);
    }

    #[test]
    fn test_always_within_clamp() {
        let limits = DepthLimits::default();
        let models = [
            soft_mode(),
            DynamicsModel::new(2500.0, 0.01, 1.0e3),
            DynamicsModel::new(400.0, 0.08, 5e7),
        ];
        for model in &models {
            for flutes in [1, 2, 3, 4, 6] {
                for step in 0..=300 {
                    let speed = 500.0 + step as f64 * 100.0;
                    let result = evaluate(speed, model, 2000.0, flutes, &limits);
                    assert!(result.depth >= 0.1 && result.depth <= 50.0);
                }
            }
        }
    }

    #[test]
    fn test_custom_ceiling() {
        let limits = DepthLimits {
            ceiling: 20.0,
            ..Default::default()
        };
        let result = evaluate(12000.0, &soft_mode(), 2000.0, 4, &limits);
        assert_eq!(result.depth, 20.0);
    }

    #[test]
    fn test_limits_validation() {
        assert!(DepthLimits::default().validate().is_ok());
        let inverted = DepthLimits {
            floor: 5.0,
            ceiling: 1.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
