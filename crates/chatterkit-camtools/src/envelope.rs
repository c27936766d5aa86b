//! Machine envelope validator
//!
//! Folds spindle speed, power and torque limits together with the chatter
//! verdict into one go/no-go result. Every failed check is reported as a
//! [`Violation`] with a corrective suggestion where one exists. The validator
//! is advisory only and never retries a request.

use chatterkit_core::units::{rpm_from_surface_speed, surface_speed_from_rpm, torque_from_power};
use chatterkit_core::{
    ensure_positive, CuttingState, MachineLimits, MaterialCuttingProperties, ParameterError,
    Result, ToolGeometry,
};
use chatterkit_dynamics::{SpeedRange, StabilityAnalyzer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default stability lookup tolerance in rev/min
pub const DEFAULT_LOBE_TOLERANCE_RPM: f64 = 100.0;
/// Default empirical specific-energy factor for the power estimate
pub const DEFAULT_SPECIFIC_ENERGY_FACTOR: f64 = 2.5;

/// Share of the critical depth suggested after a stability failure
const SAFE_DEPTH_FRACTION: f64 = 0.7;
/// Relative disagreement allowed when both spindle and surface speed are given
pub const SPEED_MATCH_TOLERANCE: f64 = 0.01;

/// Tuning parameters of the envelope validator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeSettings {
    /// Candidate speed may be matched to a lobe sample this far away (rev/min)
    pub lobe_tolerance_rpm: f64,
    /// Number of sweep intervals for the diagram around the candidate speed
    pub sweep_points: usize,
    /// Half-width of the sweep as a fraction of the candidate speed
    pub sweep_span: f64,
    /// Factor in `P ≈ Vc·feed·a_p·factor/60000`
    pub specific_energy_factor: f64,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            lobe_tolerance_rpm: DEFAULT_LOBE_TOLERANCE_RPM,
            sweep_points: 200,
            sweep_span: 0.5,
            specific_energy_factor: DEFAULT_SPECIFIC_ENERGY_FACTOR,
        }
    }
}

impl EnvelopeSettings {
    /// Validate the settings
    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        ensure_positive("lobe_tolerance_rpm", self.lobe_tolerance_rpm)?;
        ensure_positive("specific_energy_factor", self.specific_energy_factor)?;
        if self.sweep_points < 2 {
            return Err(ParameterError::invalid(
                "sweep_points",
                "at least two intervals are required",
            ));
        }
        if self.sweep_points % 2 != 0 {
            return Err(ParameterError::invalid(
                "sweep_points",
                "must be even so the candidate speed is sampled",
            ));
        }
        if !(self.sweep_span > 0.0 && self.sweep_span < 1.0) {
            return Err(ParameterError::OutOfRange {
                name: "sweep_span".to_string(),
                value: self.sweep_span,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Machine constraint that a cut can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    SpindleSpeed,
    Power,
    Torque,
    Stability,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Constraint::SpindleSpeed => "spindle speed",
            Constraint::Power => "power",
            Constraint::Torque => "torque",
            Constraint::Stability => "stability",
        };
        f.write_str(name)
    }
}

/// A failed envelope check and how to fix it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which check failed
    pub constraint: Constraint,
    /// Operator-facing description
    pub message: String,
    /// Spindle speed to move to, in rev/min
    pub suggested_speed: Option<f64>,
    /// Feed rate to drop to, in mm/min
    pub suggested_feed: Option<f64>,
    /// Axial depth to drop to, in mm
    pub suggested_depth: Option<f64>,
}

impl Violation {
    fn new(constraint: Constraint, message: String) -> Self {
        Self {
            constraint,
            message,
            suggested_speed: None,
            suggested_feed: None,
            suggested_depth: None,
        }
    }
}

/// Composite verdict for a cut on a machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeVerdict {
    pub rpm_ok: bool,
    pub power_ok: bool,
    pub torque_ok: bool,
    /// True when the machine has no modal data
    pub stability_ok: bool,
    /// Conjunction of the four checks
    pub overall_ok: bool,
    /// Spindle speed evaluated, in rev/min
    pub spindle_speed: f64,
    /// Surface speed evaluated, in m/min
    pub surface_speed: f64,
    /// Estimated cutting power in kW
    pub estimated_power: f64,
    /// Estimated spindle torque in N·m
    pub estimated_torque: f64,
    /// Critical depth at the nearest lobe sample, when stability was checked
    pub critical_depth: Option<f64>,
    /// The critical depth hit its clamp and the stability call is weak
    pub low_confidence: bool,
    /// Best stable pocket speed, set only when the stability check failed
    pub sweet_spot_rpm: Option<f64>,
    /// Failed checks with corrective suggestions
    pub violations: Vec<Violation>,
}

impl EnvelopeVerdict {
    /// Check if a given constraint failed
    pub fn violates(&self, constraint: Constraint) -> bool {
        self.violations.iter().any(|v| v.constraint == constraint)
    }
}

/// Estimated cutting power in kW: `Vc·feed·a_p·factor/60000`
pub fn estimate_power(surface_speed: f64, feed_rate: f64, axial_depth: f64, factor: f64) -> f64 {
    surface_speed * feed_rate * axial_depth * factor / 60000.0
}

/// Envelope validator
#[derive(Debug, Clone, Default)]
pub struct EnvelopeValidator {
    analyzer: StabilityAnalyzer,
    settings: EnvelopeSettings,
}

impl EnvelopeValidator {
    /// Validator with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with an explicit analyzer and settings
    pub fn with_settings(analyzer: StabilityAnalyzer, settings: EnvelopeSettings) -> Self {
        Self { analyzer, settings }
    }

    /// Settings in use
    pub fn settings(&self) -> &EnvelopeSettings {
        &self.settings
    }

    /// Check a cut against the machine envelope
    ///
    /// Malformed inputs are rejected; every well-formed input produces a
    /// complete verdict.
    pub fn validate(
        &self,
        machine: &MachineLimits,
        tool: &ToolGeometry,
        material: &MaterialCuttingProperties,
        state: &CuttingState,
    ) -> Result<EnvelopeVerdict> {
        machine.validate()?;
        tool.validate()?;
        material.validate()?;
        state.validate()?;
        self.settings.validate()?;

        let d = tool.diameter;
        let (rpm, vc) = match (state.spindle_speed, state.surface_speed) {
            (Some(rpm), Some(vc)) => {
                let derived = surface_speed_from_rpm(rpm, d);
                if ((derived - vc) / vc).abs() > SPEED_MATCH_TOLERANCE {
                    return Err(ParameterError::invalid(
                        "surface_speed",
                        format!(
                            "{:.1} m/min disagrees with {:.0} rpm on a {:.1} mm tool ({:.1} m/min)",
                            vc, rpm, d, derived
                        ),
                    )
                    .into());
                }
                (rpm, vc)
            }
            (Some(rpm), None) => (rpm, surface_speed_from_rpm(rpm, d)),
            (None, Some(vc)) => (rpm_from_surface_speed(vc, d), vc),
            (None, None) => {
                return Err(ParameterError::Missing("spindle_speed or surface_speed".into()).into())
            }
        };

        let power = estimate_power(
            vc,
            state.feed_rate,
            state.axial_depth,
            self.settings.specific_energy_factor,
        );
        let torque = torque_from_power(power, rpm);

        let mut violations = Vec::new();

        let rpm_ok = rpm <= machine.max_rpm;
        if !rpm_ok {
            violations.push(Violation {
                suggested_speed: Some(machine.max_rpm),
                ..Violation::new(
                    Constraint::SpindleSpeed,
                    format!(
                        "Spindle speed {:.0} rpm exceeds machine maximum {:.0} rpm",
                        rpm, machine.max_rpm
                    ),
                )
            });
        }

        let power_ok = power <= machine.max_power;
        if !power_ok {
            let scale = machine.max_power / power;
            violations.push(Violation {
                suggested_feed: Some(state.feed_rate * scale),
                ..Violation::new(
                    Constraint::Power,
                    format!(
                        "Estimated power {:.2} kW exceeds spindle rating {:.2} kW; scale feed by {:.2}",
                        power, machine.max_power, scale
                    ),
                )
            });
        }

        let torque_ok = torque <= machine.max_torque;
        if !torque_ok {
            let scale = machine.max_torque / torque;
            violations.push(Violation {
                suggested_depth: Some(state.axial_depth * scale),
                ..Violation::new(
                    Constraint::Torque,
                    format!(
                        "Estimated torque {:.1} N·m exceeds spindle rating {:.1} N·m; reduce depth or raise speed",
                        torque, machine.max_torque
                    ),
                )
            });
        }

        let mut stability_ok = true;
        let mut critical_depth = None;
        let mut low_confidence = false;
        let mut sweet_spot_rpm = None;
        if machine.has_dynamics() {
            let range = SpeedRange::around(rpm, self.settings.sweep_span, self.settings.sweep_points);
            let sld = self.analyzer.lobes(tool, &machine.modal, material, &range)?;
            let nearest = sld.depth_at(rpm, self.settings.lobe_tolerance_rpm);
            critical_depth = nearest.map(|s| s.critical_depth);
            low_confidence = nearest.is_some_and(|s| s.low_confidence);
            stability_ok = nearest.is_some_and(|s| state.axial_depth < s.critical_depth);
            if low_confidence {
                tracing::warn!(
                    spindle_speed = rpm,
                    critical_depth,
                    "critical depth hit its clamp; treat as low confidence"
                );
            }

            if !stability_ok {
                sweet_spot_rpm = sld.best_pocket().map(|p| p.speed);
                let message = match critical_depth {
                    Some(limit) => format!(
                        "Axial depth {:.2} mm exceeds critical depth {:.2} mm at {:.0} rpm",
                        state.axial_depth, limit, rpm
                    ),
                    None => format!(
                        "No lobe sample within {:.0} rpm of {:.0} rpm",
                        self.settings.lobe_tolerance_rpm, rpm
                    ),
                };
                violations.push(Violation {
                    suggested_speed: sweet_spot_rpm,
                    suggested_depth: critical_depth.map(|limit| limit * SAFE_DEPTH_FRACTION),
                    ..Violation::new(Constraint::Stability, message)
                });
            }
        }

        let overall_ok = rpm_ok && power_ok && torque_ok && stability_ok;
        for violation in &violations {
            tracing::info!(constraint = %violation.constraint, "{}", violation.message);
        }
        tracing::debug!(
            spindle_speed = rpm,
            power,
            torque,
            rpm_ok,
            power_ok,
            torque_ok,
            stability_ok,
            overall_ok,
            "envelope validated"
        );

        Ok(EnvelopeVerdict {
            rpm_ok,
            power_ok,
            torque_ok,
            stability_ok,
            overall_ok,
            spindle_speed: rpm,
            surface_speed: vc,
            estimated_power: power,
            estimated_torque: torque,
            critical_depth,
            low_confidence,
            sweet_spot_rpm,
            violations,
        })
    }
}
