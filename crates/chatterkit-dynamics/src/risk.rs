//! Chatter risk classification and operator recommendations
//!
//! Reacts only to numbers that have already been computed. Nothing here
//! searches speeds or re-derives dynamics.

use crate::lobes::StablePocket;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth ratio below which a cut is considered low risk
const LOW_RISK_RATIO: f64 = 0.7;

/// Discrete chatter risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// ρ < 0.7
    Low,
    /// 0.7 ≤ ρ < 0.9
    Moderate,
    /// 0.9 ≤ ρ < 1.0
    High,
    /// 1.0 ≤ ρ < 1.2
    VeryHigh,
    /// ρ ≥ 1.2
    Certain,
}

impl RiskLevel {
    /// Get all risk levels, lowest first
    pub fn all() -> &'static [RiskLevel] {
        &[
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::VeryHigh,
            RiskLevel::Certain,
        ]
    }

    /// Probability of chatter associated with the band
    pub fn probability(self) -> f64 {
        match self {
            Self::Low => 0.05,
            Self::Moderate => 0.2,
            Self::High => 0.5,
            Self::VeryHigh => 0.75,
            Self::Certain => 0.95,
        }
    }

    /// Band for a requested/critical depth ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < LOW_RISK_RATIO {
            Self::Low
        } else if ratio < 0.9 {
            Self::Moderate
        } else if ratio < 1.0 {
            Self::High
        } else if ratio < 1.2 {
            Self::VeryHigh
        } else {
            Self::Certain
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very high"),
            Self::Certain => write!(f, "certain"),
        }
    }
}

/// Risk band with its probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChatterRisk {
    /// Risk band
    pub level: RiskLevel,
    /// Probability of chatter
    pub probability: f64,
}

/// Classify a requested depth against the critical depth
pub fn classify(requested_depth: f64, critical_depth: f64) -> ChatterRisk {
    let level = RiskLevel::from_ratio(requested_depth / critical_depth);
    ChatterRisk {
        level,
        probability: level.probability(),
    }
}

/// Stability verdict; authoritative over the risk band
#[inline]
pub fn is_stable(requested_depth: f64, critical_depth: f64) -> bool {
    requested_depth < critical_depth
}

/// Urgency of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Act before cutting
    High,
    /// Worth considering
    Medium,
}

/// What a recommendation asks the operator to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Reduce axial depth of cut
    ReduceDepth,
    /// Move the spindle speed into a stable pocket
    ChangeSpeed,
    /// Stable, but with little headroom
    MarginWarning,
}

/// Operator-facing advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to change
    pub kind: RecommendationKind,
    /// How urgent it is
    pub priority: Priority,
    /// Human-readable advice
    pub message: String,
    /// Depth to use instead, in mm
    pub suggested_depth: Option<f64>,
    /// Speed to use instead, in rev/min
    pub suggested_speed: Option<f64>,
}

/// Recommendations for an evaluated cut
///
/// `nearest_pocket` is the result of a search the caller already ran, if any.
pub fn recommend(
    requested_depth: f64,
    critical_depth: f64,
    stable: bool,
    risk: &ChatterRisk,
    nearest_pocket: Option<&StablePocket>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if !stable {
        recommendations.push(Recommendation {
            kind: RecommendationKind::ReduceDepth,
            priority: Priority::High,
            message: format!(
                "Reduce axial depth below {:.2} mm (requested {:.2} mm)",
                critical_depth, requested_depth
            ),
            suggested_depth: Some(critical_depth * LOW_RISK_RATIO),
            suggested_speed: None,
        });

        let message = match nearest_pocket {
            Some(pocket) => format!(
                "Try {:.0} rpm, a stable pocket allowing up to {:.2} mm",
                pocket.speed, pocket.max_depth
            ),
            None => "Try a different spindle speed to find a stable pocket".to_string(),
        };
        recommendations.push(Recommendation {
            kind: RecommendationKind::ChangeSpeed,
            priority: Priority::Medium,
            message,
            suggested_depth: None,
            suggested_speed: nearest_pocket.map(|p| p.speed),
        });
    } else if risk.level == RiskLevel::High {
        recommendations.push(Recommendation {
            kind: RecommendationKind::MarginWarning,
            priority: Priority::Medium,
            message: format!(
                "Stable with little margin: {:.2} mm requested against a {:.2} mm limit",
                requested_depth, critical_depth
            ),
            suggested_depth: Some(critical_depth * LOW_RISK_RATIO),
            suggested_speed: None,
        });
    }

    recommendations
}
