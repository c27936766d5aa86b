//! Material classes and cutting coefficients
//!
//! This module provides:
//! - The closed set of material classes the advisor distinguishes
//! - Default specific cutting force per class
//! - Lenient name lookup for collaborator databases

use crate::error::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Material classes for engagement and cutting-force tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    /// Wrought and cast aluminum alloys
    Aluminum,
    /// Brass and free-machining copper alloys
    Brass,
    /// Engineering plastics
    Plastic,
    /// Carbon and low-alloy steels
    Steel,
    /// Austenitic and martensitic stainless steels
    StainlessSteel,
    /// Grey and ductile cast iron
    CastIron,
    /// Titanium alloys (Ti-6Al-4V and similar)
    Titanium,
    /// Nickel-based superalloys
    Inconel,
}

impl MaterialClass {
    /// Get all material classes
    pub fn all() -> &'static [MaterialClass] {
        &[
            MaterialClass::Aluminum,
            MaterialClass::Brass,
            MaterialClass::Plastic,
            MaterialClass::Steel,
            MaterialClass::StainlessSteel,
            MaterialClass::CastIron,
            MaterialClass::Titanium,
            MaterialClass::Inconel,
        ]
    }

    /// Typical specific cutting force K_c in N/mm²
    pub fn default_specific_cutting_force(self) -> f64 {
        match self {
            Self::Aluminum => 700.0,
            Self::Brass => 780.0,
            Self::Plastic => 150.0,
            Self::Steel => 2000.0,
            Self::StainlessSteel => 2450.0,
            Self::CastIron => 1100.0,
            Self::Titanium => 1700.0,
            Self::Inconel => 2900.0,
        }
    }

    /// Look up a class by a free-form material name
    ///
    /// Names from reference databases ("6061-T6", "Ti-6Al-4V", "mild steel")
    /// are matched by keyword. Anything unrecognised is treated as steel.
    pub fn from_name(name: &str) -> Self {
        if let Ok(class) = name.parse() {
            return class;
        }
        let lower = name.to_lowercase();
        let keyword_match = [
            (&["alumin", "6061", "7075", "2024"][..], Self::Aluminum),
            (&["brass", "bronze", "copper"][..], Self::Brass),
            (&["plastic", "acrylic", "delrin", "acetal", "nylon", "hdpe"][..], Self::Plastic),
            (&["stainless", "304", "316", "17-4"][..], Self::StainlessSteel),
            (&["cast iron", "ductile", "grey iron", "gray iron"][..], Self::CastIron),
            (&["titan", "ti-6al"][..], Self::Titanium),
            (&["inconel", "nickel", "hastelloy", "waspaloy"][..], Self::Inconel),
            (&["steel", "1018", "4140"][..], Self::Steel),
        ]
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, class)| *class);

        keyword_match.unwrap_or_else(|| {
            tracing::warn!(material = name, "unknown material, using steel tables");
            Self::Steel
        })
    }
}

impl fmt::Display for MaterialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aluminum => write!(f, "Aluminum"),
            Self::Brass => write!(f, "Brass"),
            Self::Plastic => write!(f, "Plastic"),
            Self::Steel => write!(f, "Steel"),
            Self::StainlessSteel => write!(f, "Stainless Steel"),
            Self::CastIron => write!(f, "Cast Iron"),
            Self::Titanium => write!(f, "Titanium"),
            Self::Inconel => write!(f, "Inconel"),
        }
    }
}

impl FromStr for MaterialClass {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "aluminum" | "aluminium" => Ok(Self::Aluminum),
            "brass" => Ok(Self::Brass),
            "plastic" => Ok(Self::Plastic),
            "steel" => Ok(Self::Steel),
            "stainless_steel" | "stainless" => Ok(Self::StainlessSteel),
            "cast_iron" => Ok(Self::CastIron),
            "titanium" => Ok(Self::Titanium),
            "inconel" => Ok(Self::Inconel),
            _ => Err(ParameterError::invalid(
                "material",
                format!("unknown material class '{}'", s),
            )),
        }
    }
}

/// Material coefficients consumed by the stability model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCuttingProperties {
    /// Material class
    pub class: MaterialClass,
    /// Specific cutting force K_c in N/mm²
    pub specific_cutting_force: f64,
}

impl MaterialCuttingProperties {
    /// Properties with the class default K_c
    pub fn for_class(class: MaterialClass) -> Self {
        Self {
            class,
            specific_cutting_force: class.default_specific_cutting_force(),
        }
    }

    /// Replace K_c with a measured or database value
    pub fn with_specific_cutting_force(mut self, kc: f64) -> Self {
        self.specific_cutting_force = kc;
        self
    }

    /// Reject non-positive cutting force
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("specific_cutting_force", self.specific_cutting_force)?;
        Ok(())
    }
}

impl Default for MaterialCuttingProperties {
    fn default() -> Self {
        Self::for_class(MaterialClass::Steel)
    }
}
