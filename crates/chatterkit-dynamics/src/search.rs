//! Stable-speed search
//!
//! Scans a window around a target speed for the closest speed at which a
//! required depth is stable. Coming back empty is an expected outcome: the
//! caller should widen the window or relax the depth.

use crate::critical_depth::{evaluate, DepthLimits};
use crate::lobes::StablePocket;
use crate::modal::DynamicsModel;
use chatterkit_core::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};

/// Search window settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Half-width of the scanned window in rev/min
    pub window_rpm: f64,
    /// Scan increment in rev/min
    pub step_rpm: f64,
    /// Speeds below this are never proposed
    pub min_speed_rpm: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            window_rpm: 2000.0,
            step_rpm: 100.0,
            min_speed_rpm: 500.0,
        }
    }
}

impl SearchSettings {
    /// Reject windows that cannot be scanned
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("search.step_rpm", self.step_rpm)?;
        if !(self.window_rpm.is_finite() && self.window_rpm >= 0.0) {
            return Err(ParameterError::invalid(
                "search.window_rpm",
                "must be zero or positive",
            ));
        }
        if !(self.min_speed_rpm.is_finite() && self.min_speed_rpm >= 0.0) {
            return Err(ParameterError::invalid(
                "search.min_speed_rpm",
                "must be zero or positive",
            ));
        }
        Ok(())
    }
}

/// Closest speed to `target_speed` where `required_depth` is below the critical depth
///
/// Returns `Ok(None)` when no sampled speed in the window qualifies.
#[allow(clippy::too_many_arguments)]
pub fn find_nearest_stable(
    target_speed: f64,
    required_depth: f64,
    dynamics: &DynamicsModel,
    specific_cutting_force: f64,
    flutes: u32,
    settings: &SearchSettings,
    limits: &DepthLimits,
) -> Result<Option<StablePocket>, ParameterError> {
    ensure_positive("target_speed", target_speed)?;
    ensure_positive("required_depth", required_depth)?;
    dynamics.validate()?;
    ensure_positive("specific_cutting_force", specific_cutting_force)?;
    if flutes == 0 {
        return Err(ParameterError::invalid("flutes", "tool must have at least one flute"));
    }
    settings.validate()?;
    limits.validate()?;

    let steps = (settings.window_rpm / settings.step_rpm).floor() as i64;
    let mut best: Option<StablePocket> = None;
    let mut best_distance = f64::INFINITY;

    for i in -steps..=steps {
        let offset = i as f64 * settings.step_rpm;
        let speed = target_speed + offset;
        if speed < settings.min_speed_rpm {
            continue;
        }
        let distance = offset.abs();
        if distance >= best_distance {
            continue;
        }
        let depth = evaluate(speed, dynamics, specific_cutting_force, flutes, limits).depth;
        if depth > required_depth {
            best = Some(StablePocket {
                speed,
                max_depth: depth,
            });
            best_distance = distance;
        }
    }

    tracing::trace!(
        target_speed,
        required_depth,
        found = ?best.map(|p| p.speed),
        "stable speed search"
    );
    Ok(best)
}
