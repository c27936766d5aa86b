//! Stability analyzer
//!
//! Composes the resolver, the critical-depth primitive, the risk classifier
//! and the stable-speed search into one report per evaluated cut.

use crate::critical_depth::evaluate;
use crate::lobes::{self, SpeedRange, StabilityLobeDiagram, StabilitySettings, StablePocket};
use crate::modal::{DynamicsModel, ModalDefaults};
use crate::risk::{self, ChatterRisk, Recommendation};
use crate::search::{find_nearest_stable, SearchSettings};
use chatterkit_core::units::tooth_passing_frequency;
use chatterkit_core::{
    ensure_positive, MaterialCuttingProperties, ModalOverride, Result, ToolGeometry,
};
use serde::{Deserialize, Serialize};

/// A cut to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityRequest {
    /// Cutter geometry
    pub tool: ToolGeometry,
    /// Measured modal data, if any
    #[serde(default)]
    pub modal: ModalOverride,
    /// Workpiece material
    pub material: MaterialCuttingProperties,
    /// Spindle speed in rev/min
    pub spindle_speed: f64,
    /// Requested axial depth in mm
    pub axial_depth: f64,
}

/// Stability report for one cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    /// Requested depth is below the critical depth
    pub stable: bool,
    /// Advisory risk band
    pub risk: ChatterRisk,
    /// Critical depth at the requested speed, in mm
    pub critical_depth: f64,
    /// The critical depth hit the clamp and is not a precise limit
    pub low_confidence: bool,
    /// Tooth-passing frequency in Hz
    pub tooth_passing_frequency: f64,
    /// Natural frequency of the resolved model in Hz
    pub natural_frequency: f64,
    /// Fractional headroom, `max(0, critical/requested − 1)`
    pub stability_margin: f64,
    /// Operator advice
    pub recommendations: Vec<Recommendation>,
    /// Closest speed where the requested depth is stable
    pub nearest_stable_pocket: Option<StablePocket>,
}

/// Stability analyzer with its tuning parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StabilityAnalyzer {
    modal_defaults: ModalDefaults,
    stability: StabilitySettings,
    search: SearchSettings,
}

impl StabilityAnalyzer {
    /// Analyzer with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with explicit parameters
    pub fn with_settings(
        modal_defaults: ModalDefaults,
        stability: StabilitySettings,
        search: SearchSettings,
    ) -> Self {
        Self {
            modal_defaults,
            stability,
            search,
        }
    }

    /// Stability settings in use
    pub fn stability_settings(&self) -> &StabilitySettings {
        &self.stability
    }

    /// Search settings in use
    pub fn search_settings(&self) -> &SearchSettings {
        &self.search
    }

    /// Resolve the modal model for a tool
    pub fn resolve(&self, tool: &ToolGeometry, measured: &ModalOverride) -> DynamicsModel {
        self.modal_defaults.resolve(tool, measured)
    }

    /// Evaluate a single cut
    pub fn analyze(&self, request: &StabilityRequest) -> Result<StabilityResult> {
        request.tool.validate()?;
        request.modal.validate()?;
        request.material.validate()?;
        ensure_positive("spindle_speed", request.spindle_speed)?;
        ensure_positive("axial_depth", request.axial_depth)?;

        let dynamics = self.resolve(&request.tool, &request.modal);
        dynamics.validate()?;
        let kc = request.material.specific_cutting_force;
        let flutes = request.tool.flutes;

        let critical = evaluate(
            request.spindle_speed,
            &dynamics,
            kc,
            flutes,
            &self.stability.depth_limits,
        );
        if critical.low_confidence {
            tracing::warn!(
                spindle_speed = request.spindle_speed,
                critical_depth = critical.depth,
                "critical depth hit its clamp; treat as low confidence"
            );
        }

        let stable = risk::is_stable(request.axial_depth, critical.depth);
        let chatter_risk = risk::classify(request.axial_depth, critical.depth);
        let nearest_stable_pocket = find_nearest_stable(
            request.spindle_speed,
            request.axial_depth,
            &dynamics,
            kc,
            flutes,
            &self.search,
            &self.stability.depth_limits,
        )?;
        let recommendations = risk::recommend(
            request.axial_depth,
            critical.depth,
            stable,
            &chatter_risk,
            nearest_stable_pocket.as_ref(),
        );

        tracing::debug!(
            spindle_speed = request.spindle_speed,
            axial_depth = request.axial_depth,
            critical_depth = critical.depth,
            stable,
            risk = %chatter_risk.level,
            "stability evaluated"
        );

        Ok(StabilityResult {
            stable,
            risk: chatter_risk,
            critical_depth: critical.depth,
            low_confidence: critical.low_confidence,
            tooth_passing_frequency: tooth_passing_frequency(request.spindle_speed, flutes),
            natural_frequency: dynamics.natural_frequency,
            stability_margin: (critical.depth / request.axial_depth - 1.0).max(0.0),
            recommendations,
            nearest_stable_pocket,
        })
    }

    /// Lobe diagram for a tool and material over a speed range
    pub fn lobes(
        &self,
        tool: &ToolGeometry,
        measured: &ModalOverride,
        material: &MaterialCuttingProperties,
        range: &SpeedRange,
    ) -> Result<StabilityLobeDiagram> {
        tool.validate()?;
        measured.validate()?;
        material.validate()?;
        let dynamics = self.resolve(tool, measured);
        lobes::build(
            &dynamics,
            material.specific_cutting_force,
            tool.flutes,
            range,
            &self.stability,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{RecommendationKind, RiskLevel};
    use approx::assert_relative_eq;

    fn soft_request(spindle_speed: f64, axial_depth: f64) -> StabilityRequest {
        StabilityRequest {
            tool: ToolGeometry::with_default_stickout(12.0, 4),
            modal: ModalOverride {
                natural_frequency: Some(800.0),
                damping_ratio: Some(0.03),
                modal_stiffness: Some(2.0e4),
            },
            material: MaterialCuttingProperties::default(),
            spindle_speed,
            axial_depth,
        }
    }

    #[test]
    fn test_unstable_cut_reports_advice() {
        let result = StabilityAnalyzer::new()
            .analyze(&soft_request(10500.0, 2.0))
            .unwrap();
        assert!(!result.stable);
        assert_eq!(result.risk.level, RiskLevel::Certain);
        assert_eq!(result.stability_margin, 0.0);
        assert_relative_eq!(result.tooth_passing_frequency, 700.0);
        assert_eq!(result.natural_frequency, 800.0);
        assert_eq!(result.recommendations[0].kind, RecommendationKind::ReduceDepth);
        let pocket = result.nearest_stable_pocket.unwrap();
        assert_eq!(pocket.speed, 12000.0);
        assert_eq!(result.recommendations[1].suggested_speed, Some(12000.0));
    }

    #[test]
    fn test_stable_cut_margin() {
        let result = StabilityAnalyzer::new()
            .analyze(&soft_request(60.0, 0.5))
            .unwrap();
        assert!(result.stable);
        assert_eq!(result.risk.level, RiskLevel::Low);
        assert_relative_eq!(
            result.stability_margin,
            result.critical_depth / 0.5 - 1.0,
            epsilon = 1e-12
        );
        assert!(result.recommendations.is_empty());
        assert!(!result.low_confidence);
    }

    #[test]
    fn test_invalid_request_rejected() {
        let analyzer = StabilityAnalyzer::new();
        assert!(analyzer.analyze(&soft_request(0.0, 2.0)).is_err());
        assert!(analyzer.analyze(&soft_request(8000.0, -1.0)).is_err());

        let mut request = soft_request(8000.0, 2.0);
        request.tool.diameter = 0.0;
        assert!(analyzer.analyze(&request).unwrap_err().is_parameter_error());
    }

    #[test]
    fn test_lobes_use_resolved_model() {
        let request = soft_request(8000.0, 2.0);
        let sld = StabilityAnalyzer::new()
            .lobes(
                &request.tool,
                &request.modal,
                &request.material,
                &SpeedRange::new(10000.0, 14000.0, 40),
            )
            .unwrap();
        assert_eq!(sld.best_pocket().map(|p| p.speed), Some(12000.0));
    }
}
