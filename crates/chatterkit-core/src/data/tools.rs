//! Tool geometry module
//!
//! This module provides:
//! - Cutter geometry as seen by the stability model (diameter, flutes, stickout)
//! - The default tool profile used when a caller omits fields
//! - Field-by-field overrides resolved over that profile

use crate::error::{ensure_positive, ParameterError};
use serde::{Deserialize, Serialize};

/// Default cutting diameter in mm
pub const DEFAULT_DIAMETER: f64 = 12.0;
/// Default flute count
pub const DEFAULT_FLUTES: u32 = 4;
/// Default stickout as a multiple of diameter
pub const DEFAULT_STICKOUT_RATIO: f64 = 4.0;

/// Cutter geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolGeometry {
    /// Cutting diameter in mm
    pub diameter: f64,
    /// Number of flutes
    pub flutes: u32,
    /// Length from holder face to tool tip in mm
    pub stickout: f64,
}

impl ToolGeometry {
    /// Create a tool with an explicit stickout
    pub fn new(diameter: f64, flutes: u32, stickout: f64) -> Self {
        Self {
            diameter,
            flutes,
            stickout,
        }
    }

    /// Create a tool whose stickout follows the default L/D ratio
    pub fn with_default_stickout(diameter: f64, flutes: u32) -> Self {
        Self::new(diameter, flutes, diameter * DEFAULT_STICKOUT_RATIO)
    }

    /// Reject geometry the model cannot evaluate
    pub fn validate(&self) -> Result<(), ParameterError> {
        ensure_positive("diameter", self.diameter)?;
        ensure_positive("stickout", self.stickout)?;
        if self.flutes == 0 {
            return Err(ParameterError::invalid("flutes", "tool must have at least one flute"));
        }
        Ok(())
    }
}

impl Default for ToolGeometry {
    fn default() -> Self {
        Self::with_default_stickout(DEFAULT_DIAMETER, DEFAULT_FLUTES)
    }
}

/// Optional tool fields supplied by a caller
///
/// Unset fields fall back to the default profile. An unset stickout follows
/// the resolved diameter, not the default one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOverrides {
    /// Cutting diameter in mm
    pub diameter: Option<f64>,
    /// Number of flutes
    pub flutes: Option<u32>,
    /// Stickout in mm
    pub stickout: Option<f64>,
}

impl ToolOverrides {
    /// Resolve over [`ToolGeometry::default`]
    pub fn resolve(&self) -> ToolGeometry {
        self.resolve_over(&ToolGeometry::default())
    }

    /// Resolve over a named base profile
    pub fn resolve_over(&self, base: &ToolGeometry) -> ToolGeometry {
        let diameter = self.diameter.unwrap_or(base.diameter);
        let stickout = match (self.stickout, self.diameter) {
            (Some(stickout), _) => stickout,
            (None, Some(d)) => d * DEFAULT_STICKOUT_RATIO,
            (None, None) => base.stickout,
        };
        ToolGeometry {
            diameter,
            flutes: self.flutes.unwrap_or(base.flutes),
            stickout,
        }
    }
}
