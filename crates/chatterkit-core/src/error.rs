//! Error handling for ChatterKit
//!
//! Provides the error types shared by every crate in the workspace:
//! - Parameter errors (malformed geometry, speeds, ranges)
//! - Configuration errors (settings files, validation)
//!
//! Physical edge cases are not errors. A critical depth that hits its clamp is
//! reported as a low-confidence value, and an exhausted speed search is `None`.
//! Only inputs that cannot be evaluated at all are rejected here.

use thiserror::Error;

/// Parameter error type
///
/// Raised at the boundary of a computation when an input cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A required parameter is missing.
    #[error("Missing required parameter: {0}")]
    Missing(String),

    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Lower bound of the valid range.
        min: f64,
        /// Upper bound of the valid range.
        max: f64,
    },

    /// A parameter must be strictly positive.
    #[error("Parameter '{name}' must be positive, got {value}")]
    NotPositive {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A range has its bounds in the wrong order or is empty.
    #[error("Invalid range for '{name}': min {min} must be below max {max}")]
    InvalidRange {
        /// The range name.
        name: String,
        /// The rejected lower bound.
        min: f64,
        /// The rejected upper bound.
        max: f64,
    },
}

impl ParameterError {
    /// Shorthand for [`ParameterError::NotPositive`]
    pub fn not_positive(name: impl Into<String>, value: f64) -> Self {
        Self::NotPositive {
            name: name.into(),
            value,
        }
    }

    /// Shorthand for [`ParameterError::InvalidValue`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Main error type for ChatterKit
///
/// A unified error type used in all public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter error
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Configuration error (loading, parsing, validating settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error from a string message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a parameter error
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Error::Parameter(_))
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reject zero, negative and non-finite values.
pub fn ensure_positive(name: &str, value: f64) -> std::result::Result<f64, ParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ParameterError::not_positive(name, value))
    }
}
