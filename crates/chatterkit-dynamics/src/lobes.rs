//! Stability lobe diagram builder
//!
//! Sweeps a speed range through the critical-depth primitive and extracts
//! the local maxima ("stable pockets") that make good operating speeds.

use crate::critical_depth::{evaluate, DepthLimits};
use crate::modal::DynamicsModel;
use chatterkit_core::{ensure_positive, ParameterError, Result};
use serde::{Deserialize, Serialize};

/// Default pocket noise floor in mm
pub const DEFAULT_POCKET_NOISE_FLOOR: f64 = 2.0;

/// Settings shared by lobe sweeps and single-speed evaluations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilitySettings {
    /// Clamp band for the critical-depth primitive
    pub depth_limits: DepthLimits,
    /// Local maxima at or below this depth (mm) are not reported as pockets
    pub pocket_noise_floor: f64,
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            depth_limits: DepthLimits::default(),
            pocket_noise_floor: DEFAULT_POCKET_NOISE_FLOOR,
        }
    }
}

impl StabilitySettings {
    /// Validate the clamp band and noise floor
    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        self.depth_limits.validate()?;
        ensure_positive("pocket_noise_floor", self.pocket_noise_floor)?;
        Ok(())
    }
}

/// An evenly sampled spindle speed range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    /// Lowest speed in rev/min
    pub min: f64,
    /// Highest speed in rev/min
    pub max: f64,
    /// Number of intervals; the sweep visits `points + 1` speeds
    pub points: usize,
}

impl SpeedRange {
    /// Create a range
    pub fn new(min: f64, max: f64, points: usize) -> Self {
        Self { min, max, points }
    }

    /// Range of `±span` (fraction of centre) around a centre speed
    pub fn around(center: f64, span: f64, points: usize) -> Self {
        Self {
            min: center * (1.0 - span),
            max: center * (1.0 + span),
            points,
        }
    }

    /// Distance between neighbouring samples in rev/min
    pub fn step(&self) -> f64 {
        (self.max - self.min) / self.points as f64
    }

    /// Speed of sample `i`
    pub fn speed_at(&self, i: usize) -> f64 {
        self.min + self.step() * i as f64
    }

    /// Reject degenerate ranges before any sweep
    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        ensure_positive("speed_range.min", self.min)?;
        if !(self.max.is_finite() && self.min < self.max) {
            return Err(ParameterError::InvalidRange {
                name: "speed_range".to_string(),
                min: self.min,
                max: self.max,
            });
        }
        if self.points == 0 {
            return Err(ParameterError::invalid(
                "speed_range.points",
                "at least one interval is required",
            ));
        }
        Ok(())
    }
}

/// One sampled speed of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LobeSample {
    /// Spindle speed in rev/min
    pub speed: f64,
    /// Critical depth in mm
    pub critical_depth: f64,
    /// The critical depth hit the clamp
    pub low_confidence: bool,
}

/// A preferred operating speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StablePocket {
    /// Spindle speed in rev/min
    pub speed: f64,
    /// Largest stable axial depth at that speed, in mm
    pub max_depth: f64,
}

/// Critical depth versus spindle speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityLobeDiagram {
    samples: Vec<LobeSample>,
    stable_pockets: Vec<StablePocket>,
}

impl StabilityLobeDiagram {
    /// Assemble a diagram from samples, extracting pockets
    pub fn from_samples(samples: Vec<LobeSample>, noise_floor: f64) -> Self {
        let stable_pockets = extract_pockets(&samples, noise_floor);
        Self {
            samples,
            stable_pockets,
        }
    }

    /// Samples ordered by speed
    pub fn samples(&self) -> &[LobeSample] {
        &self.samples
    }

    /// Pockets, deepest first
    pub fn stable_pockets(&self) -> &[StablePocket] {
        &self.stable_pockets
    }

    /// Deepest pocket, if any
    pub fn best_pocket(&self) -> Option<&StablePocket> {
        self.stable_pockets.first()
    }

    /// Sample closest to `speed`, if one lies within `tolerance` rev/min
    pub fn depth_at(&self, speed: f64, tolerance: f64) -> Option<&LobeSample> {
        let mut nearest: Option<&LobeSample> = None;
        for sample in &self.samples {
            let distance = (sample.speed - speed).abs();
            if distance > tolerance {
                continue;
            }
            match nearest {
                Some(best) if (best.speed - speed).abs() <= distance => {}
                _ => nearest = Some(sample),
            }
        }
        nearest
    }

    /// Number of samples that hit the clamp
    pub fn low_confidence_count(&self) -> usize {
        self.samples.iter().filter(|s| s.low_confidence).count()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the diagram has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Sweep a speed range and build the diagram
pub fn build(
    dynamics: &DynamicsModel,
    specific_cutting_force: f64,
    flutes: u32,
    range: &SpeedRange,
    settings: &StabilitySettings,
) -> Result<StabilityLobeDiagram> {
    range.validate()?;
    dynamics.validate()?;
    ensure_positive("specific_cutting_force", specific_cutting_force)?;
    if flutes == 0 {
        return Err(ParameterError::invalid("flutes", "tool must have at least one flute").into());
    }

    let samples: Vec<LobeSample> = (0..=range.points)
        .map(|i| {
            let speed = range.speed_at(i);
            let result = evaluate(
                speed,
                dynamics,
                specific_cutting_force,
                flutes,
                &settings.depth_limits,
            );
            LobeSample {
                speed,
                critical_depth: result.depth,
                low_confidence: result.low_confidence,
            }
        })
        .collect();

    let diagram = StabilityLobeDiagram::from_samples(samples, settings.pocket_noise_floor);
    tracing::debug!(
        min = range.min,
        max = range.max,
        samples = diagram.len(),
        pockets = diagram.stable_pockets.len(),
        clamped = diagram.low_confidence_count(),
        "built stability lobe diagram"
    );
    Ok(diagram)
}

/// Interior local maxima above the noise floor, deepest first
pub fn extract_pockets(samples: &[LobeSample], noise_floor: f64) -> Vec<StablePocket> {
    let mut pockets = Vec::new();
    for i in 1..samples.len().saturating_sub(1) {
        let depth = samples[i].critical_depth;
        if depth > samples[i - 1].critical_depth
            && depth > samples[i + 1].critical_depth
            && depth > noise_floor
        {
            pockets.push(StablePocket {
                speed: samples[i].speed,
                max_depth: depth,
            });
        }
    }
    pockets.sort_by(|a, b| b.max_depth.total_cmp(&a.max_depth));
    pockets
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(speed: f64, critical_depth: f64) -> LobeSample {
        LobeSample {
            speed,
            critical_depth,
            low_confidence: false,
        }
    }

    #[test]
    fn test_single_injected_maximum() {
        let depths = [1.0, 1.2, 1.5, 4.0, 1.6, 1.3, 1.1];
        let samples: Vec<_> = depths
            .iter()
            .enumerate()
            .map(|(i, d)| sample(5000.0 + 100.0 * i as f64, *d))
            .collect();

        let pockets = extract_pockets(&samples, 2.0);
        assert_eq!(pockets.len(), 1);
        assert_eq!(pockets[0].speed, 5300.0);
        assert_eq!(pockets[0].max_depth, 4.0);
    }

    #[test]
    fn test_noise_floor_and_endpoints() {
        // Maximum below the floor, and larger values at both endpoints
        let samples = vec![
            sample(1000.0, 9.0),
            sample(1100.0, 1.0),
            sample(1200.0, 1.8),
            sample(1300.0, 1.0),
            sample(1400.0, 9.0),
        ];
        assert!(extract_pockets(&samples, 2.0).is_empty());
    }

    #[test]
    fn test_plateau_is_not_a_pocket() {
        let samples = vec![
            sample(1000.0, 1.0),
            sample(1100.0, 5.0),
            sample(1200.0, 5.0),
            sample(1300.0, 1.0),
        ];
        assert!(extract_pockets(&samples, 2.0).is_empty());
    }

    #[test]
    fn test_pockets_sorted_deepest_first() {
        let samples = vec![
            sample(1000.0, 1.0),
            sample(1100.0, 3.0),
            sample(1200.0, 1.0),
            sample(1300.0, 7.0),
            sample(1400.0, 1.0),
            sample(1500.0, 5.0),
            sample(1600.0, 1.0),
        ];
        let pockets = extract_pockets(&samples, 2.0);
        let speeds: Vec<f64> = pockets.iter().map(|p| p.speed).collect();
        assert_eq!(speeds, vec![1300.0, 1500.0, 1100.0]);
    }

    #[test]
    fn test_short_sample_lists() {
        assert!(extract_pockets(&[], 2.0).is_empty());
        assert!(extract_pockets(&[sample(1000.0, 5.0)], 2.0).is_empty());
        assert!(extract_pockets(&[sample(1000.0, 1.0), sample(1100.0, 5.0)], 2.0).is_empty());
    }

    #[test]
    fn test_sweep_visits_points_plus_one_speeds() {
        let dynamics = DynamicsModel::new(800.0, 0.03, 2.0e4);
        let range = SpeedRange::new(2000.0, 12000.0, 100);
        let sld = build(&dynamics, 2000.0, 4, &range, &StabilitySettings::default()).unwrap();

        assert_eq!(sld.len(), 101);
        assert_eq!(sld.samples()[0].speed, 2000.0);
        assert_relative_eq!(sld.samples()[100].speed, 12000.0, epsilon = 1e-9);
        assert!(sld
            .samples()
            .windows(2)
            .all(|w| w[1].speed > w[0].speed));
    }

    #[test]
    fn test_resonance_pocket_found() {
        // Tooth-passing frequency meets f_n at 12000 rpm
        let dynamics = DynamicsModel::new(800.0, 0.03, 2.0e4);
        let range = SpeedRange::new(10000.0, 14000.0, 40);
        let sld = build(&dynamics, 2000.0, 4, &range, &StabilitySettings::default()).unwrap();

        let best = sld.best_pocket().expect("pocket at resonance crossing");
        assert_relative_eq!(best.speed, 12000.0, epsilon = 1e-6);
        assert!(best.max_depth > 2.0);
    }

    #[test]
    fn test_degenerate_ranges_rejected() {
        let dynamics = DynamicsModel::new(800.0, 0.03, 2.0e4);
        let settings = StabilitySettings::default();
        for range in [
            SpeedRange::new(8000.0, 8000.0, 10),
            SpeedRange::new(9000.0, 3000.0, 10),
            SpeedRange::new(0.0, 3000.0, 10),
            SpeedRange::new(1000.0, 3000.0, 0),
        ] {
            assert!(build(&dynamics, 2000.0, 4, &range, &settings).is_err());
        }
    }

    #[test]
    fn test_depth_at_tolerance() {
        let sld = StabilityLobeDiagram::from_samples(
            vec![sample(1000.0, 1.0), sample(1150.0, 2.0), sample(1300.0, 3.0)],
            2.0,
        );
        assert_eq!(sld.depth_at(1120.0, 100.0).map(|s| s.speed), Some(1150.0));
        assert_eq!(sld.depth_at(1060.0, 100.0).map(|s| s.speed), Some(1000.0));
        assert!(sld.depth_at(1600.0, 100.0).is_none());
    }

    #[test]
    fn test_around_centre() {
        let range = SpeedRange::around(8000.0, 0.5, 100);
        assert_eq!(range.min, 4000.0);
        assert_eq!(range.max, 12000.0);
        assert_eq!(range.step(), 80.0);
    }
}
