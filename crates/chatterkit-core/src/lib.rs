//! # ChatterKit Core
//!
//! Core types, errors, and unit helpers for ChatterKit.
//! Provides the data models that collaborators hand to the stability
//! advisor: tool geometry, material coefficients, machine limits and the
//! cutting state under evaluation.

pub mod data;
pub mod error;
pub mod units;

pub use data::{
    CuttingState, MachineLimits, MaterialClass, MaterialCuttingProperties, ModalOverride,
    ToolGeometry, ToolOverrides,
};

pub use error::{ensure_positive, Error, ParameterError, Result};
