//! Adaptive radial engagement controller
//!
//! Turns a material's preferred engagement angle (or a target stepover) into
//! a radial stepover, the chip-thinning feed compensation that goes with it,
//! axial stepdown limits and helical entry defaults.

use chatterkit_core::{ensure_positive, MaterialClass, ParameterError, Result};
use serde::{Deserialize, Serialize};

/// Chip-thinning factor at radial engagement breakpoints (% of diameter)
const CHIP_THINNING_TABLE: [(f64, f64); 13] = [
    (5.0, 0.312),
    (10.0, 0.436),
    (15.0, 0.527),
    (20.0, 0.600),
    (25.0, 0.661),
    (30.0, 0.714),
    (40.0, 0.800),
    (50.0, 0.866),
    (60.0, 0.917),
    (70.0, 0.954),
    (80.0, 0.980),
    (90.0, 0.995),
    (100.0, 1.000),
];

/// Helix diameter bounds as multiples of tool diameter
const HELIX_MIN_RATIO: f64 = 0.5;
const HELIX_MAX_RATIO: f64 = 2.0;
/// Share of the pocket width a helix may occupy
const HELIX_POCKET_SHARE: f64 = 0.8;
/// Feed multiplier while ramping in
const RAMP_FEED_REDUCTION: f64 = 0.5;

/// Tool engagement angle band in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementAngles {
    /// Lightest useful engagement
    pub min: f64,
    /// Preferred engagement
    pub optimal: f64,
    /// Heaviest engagement before heat and deflection dominate
    pub max: f64,
}

impl EngagementAngles {
    /// Check if an angle lies inside the band
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

/// Engagement angle band for a material class
pub fn engagement_angles(material: MaterialClass) -> EngagementAngles {
    let (min, optimal, max) = match material {
        MaterialClass::Aluminum => (40.0, 60.0, 90.0),
        MaterialClass::Brass => (35.0, 55.0, 80.0),
        MaterialClass::Plastic => (45.0, 65.0, 90.0),
        MaterialClass::Steel => (25.0, 45.0, 70.0),
        MaterialClass::StainlessSteel => (20.0, 40.0, 60.0),
        MaterialClass::CastIron => (30.0, 50.0, 75.0),
        MaterialClass::Titanium => (20.0, 35.0, 50.0),
        MaterialClass::Inconel => (15.0, 30.0, 45.0),
    };
    EngagementAngles { min, optimal, max }
}

/// Axial stepdown limits as multiples of diameter (roughing, finishing)
fn stepdown_ratios(material: MaterialClass) -> (f64, f64) {
    match material {
        MaterialClass::Aluminum => (2.0, 1.5),
        MaterialClass::Brass => (1.5, 1.0),
        MaterialClass::Plastic => (2.0, 1.5),
        MaterialClass::Steel => (1.5, 1.0),
        MaterialClass::StainlessSteel => (1.0, 0.75),
        MaterialClass::CastIron => (1.5, 1.0),
        MaterialClass::Titanium => (1.0, 0.5),
        MaterialClass::Inconel => (0.75, 0.5),
    }
}

/// Maximum helix ramp angle in degrees
fn max_helix_angle(material: MaterialClass) -> f64 {
    match material {
        MaterialClass::Aluminum | MaterialClass::Plastic => 3.0,
        MaterialClass::Brass => 2.5,
        MaterialClass::Steel | MaterialClass::CastIron => 2.0,
        MaterialClass::StainlessSteel | MaterialClass::Titanium => 1.5,
        MaterialClass::Inconel => 1.0,
    }
}

/// Chip-thinning factor for a radial engagement in percent of diameter
///
/// Linear between table breakpoints, edge values outside 5–100 %.
pub fn chip_thinning_factor(radial_percent: f64) -> f64 {
    let (first_pct, first_factor) = CHIP_THINNING_TABLE[0];
    let (last_pct, last_factor) = CHIP_THINNING_TABLE[CHIP_THINNING_TABLE.len() - 1];
    if radial_percent <= first_pct {
        return first_factor;
    }
    if radial_percent >= last_pct {
        return last_factor;
    }
    for pair in CHIP_THINNING_TABLE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if radial_percent < x1 {
            return y0 + (y1 - y0) * (radial_percent - x0) / (x1 - x0);
        }
    }
    last_factor
}

/// Actual chip thickness for a programmed chip load at a radial engagement
pub fn actual_chip(programmed_chip: f64, radial_depth: f64, diameter: f64) -> f64 {
    programmed_chip * chip_thinning_factor(radial_depth / diameter * 100.0)
}

/// Programmed chip load that yields `target_chip` at a radial engagement
pub fn compensated_chip_load(target_chip: f64, radial_depth: f64, diameter: f64) -> f64 {
    target_chip / chip_thinning_factor(radial_depth / diameter * 100.0)
}

/// Radial depth for an engagement angle: a_e = (d/2)(1 − cos θ)
pub fn radial_depth_for_angle(diameter: f64, angle_deg: f64) -> f64 {
    diameter / 2.0 * (1.0 - angle_deg.to_radians().cos())
}

/// Engagement angle in degrees for a radial depth, the inverse of [`radial_depth_for_angle`]
///
/// Radial depths beyond a full slot are treated as a full slot (180°).
pub fn engagement_angle_for_stepover(diameter: f64, radial_depth: f64) -> f64 {
    let cos_theta = (1.0 - 2.0 * radial_depth / diameter).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// Cutting direction relative to feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MillingDirection {
    /// Climb (down) milling
    #[default]
    Climb,
    /// Conventional (up) milling
    Conventional,
}

/// Entry move defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryPlan {
    /// Helix diameter in mm; `None` when the pocket is too narrow to helix
    pub helix_diameter: Option<f64>,
    /// Maximum helix ramp angle in degrees
    pub helix_angle: f64,
    /// Cutting direction
    pub direction: MillingDirection,
    /// Feed multiplier while ramping in
    pub ramp_feed_reduction: f64,
}

/// Axial stepdown limits in mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepdownLimits {
    /// Maximum axial depth for roughing passes
    pub roughing_max: f64,
    /// Maximum axial depth for finishing passes
    pub finishing_max: f64,
}

/// Radial engagement plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementPlan {
    /// Material class the plan was built for
    pub material: MaterialClass,
    /// Tool diameter in mm
    pub tool_diameter: f64,
    /// Tool engagement angle in degrees
    pub engagement_angle: f64,
    /// Preferred angle band for the material
    pub angle_band: EngagementAngles,
    /// Radial stepover a_e in mm
    pub radial_depth: f64,
    /// Radial stepover as a percentage of tool diameter
    pub radial_depth_percent: f64,
    /// Actual / programmed chip thickness, in (0, 1]
    pub chip_thinning_factor: f64,
    /// Multiplier on programmed chip load, ≥ 1
    pub feed_compensation: f64,
    /// Entry move defaults
    pub entry: EntryPlan,
    /// Axial stepdown limits
    pub stepdown: StepdownLimits,
}

impl EngagementPlan {
    /// Check if the engagement angle is within the material band
    pub fn is_within_band(&self) -> bool {
        self.angle_band.contains(self.engagement_angle)
    }

    /// Programmed chip load that yields `target_chip` at this engagement
    pub fn programmed_chip_load(&self, target_chip: f64) -> f64 {
        target_chip * self.feed_compensation
    }

    /// Compensated table feed in mm/min
    pub fn compensated_feed_rate(&self, target_chip: f64, rpm: f64, flutes: u32) -> f64 {
        self.programmed_chip_load(target_chip) * rpm * f64::from(flutes)
    }
}

/// Parameters for the engagement controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementParameters {
    /// Workpiece material class
    pub material: MaterialClass,
    /// Tool diameter in mm
    pub tool_diameter: f64,
    /// Pocket width in mm, bounds the helix diameter
    #[serde(default)]
    pub pocket_width: Option<f64>,
    /// Explicit radial stepover in mm; the material's optimal angle is used when unset
    #[serde(default)]
    pub stepover: Option<f64>,
    /// Cutting direction for the entry and the passes that follow
    #[serde(default)]
    pub direction: MillingDirection,
}

impl EngagementParameters {
    /// Parameters at the material's optimal angle, no pocket bound
    pub fn new(material: MaterialClass, tool_diameter: f64) -> Self {
        Self {
            material,
            tool_diameter,
            pocket_width: None,
            stepover: None,
            direction: MillingDirection::Climb,
        }
    }
}

/// Engagement controller
pub struct EngagementController {
    params: EngagementParameters,
}

impl EngagementController {
    /// Create a controller with the given parameters
    pub fn new(params: EngagementParameters) -> Self {
        Self { params }
    }

    /// Build the engagement plan
    pub fn plan(&self) -> Result<EngagementPlan> {
        let p = &self.params;
        let d = ensure_positive("tool_diameter", p.tool_diameter)?;
        if let Some(width) = p.pocket_width {
            ensure_positive("pocket_width", width)?;
        }

        let angle_band = engagement_angles(p.material);
        let (engagement_angle, radial_depth) = match p.stepover {
            Some(stepover) => {
                ensure_positive("stepover", stepover)?;
                if stepover > d {
                    return Err(ParameterError::OutOfRange {
                        name: "stepover".to_string(),
                        value: stepover,
                        min: 0.0,
                        max: d,
                    }
                    .into());
                }
                (engagement_angle_for_stepover(d, stepover), stepover)
            }
            None => (
                angle_band.optimal,
                radial_depth_for_angle(d, angle_band.optimal),
            ),
        };

        let radial_depth_percent = radial_depth / d * 100.0;
        let chip_thinning_factor = chip_thinning_factor(radial_depth_percent);

        let helix_upper = match p.pocket_width {
            Some(width) => (HELIX_MAX_RATIO * d).min(HELIX_POCKET_SHARE * width),
            None => HELIX_MAX_RATIO * d,
        };
        let helix_diameter = (helix_upper >= HELIX_MIN_RATIO * d).then_some(helix_upper);

        let (roughing, finishing) = stepdown_ratios(p.material);
        let plan = EngagementPlan {
            material: p.material,
            tool_diameter: d,
            engagement_angle,
            angle_band,
            radial_depth,
            radial_depth_percent,
            chip_thinning_factor,
            feed_compensation: 1.0 / chip_thinning_factor,
            entry: EntryPlan {
                helix_diameter,
                helix_angle: max_helix_angle(p.material),
                direction: p.direction,
                ramp_feed_reduction: RAMP_FEED_REDUCTION,
            },
            stepdown: StepdownLimits {
                roughing_max: roughing * d,
                finishing_max: finishing * d,
            },
        };

        if !plan.is_within_band() {
            tracing::warn!(
                material = %p.material,
                angle = plan.engagement_angle,
                min = angle_band.min,
                max = angle_band.max,
                "stepover puts engagement outside the material band"
            );
        }
        if helix_diameter.is_none() {
            tracing::debug!(
                pocket_width = ?p.pocket_width,
                "pocket too narrow for a helix, ramp entry only"
            );
        }
        Ok(plan)
    }
}

/// Plan at the material's optimal engagement angle
pub fn plan_engagement(material: MaterialClass, tool_diameter: f64) -> Result<EngagementPlan> {
    EngagementController::new(EngagementParameters::new(material, tool_diameter)).plan()
}

/// Plan for a target radial stepover in mm
pub fn plan_for_stepover(
    material: MaterialClass,
    tool_diameter: f64,
    stepover: f64,
) -> Result<EngagementPlan> {
    EngagementController::new(EngagementParameters {
        stepover: Some(stepover),
        ..EngagementParameters::new(material, tool_diameter)
    })
    .plan()
}
