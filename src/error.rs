//! Error types for SleepSync

use thiserror::Error;

/// Input validation failures. Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid time for {field}: '{value}' (expected HH:MM, 24-hour)")]
    InvalidTime { field: String, value: String },

    #[error("Invalid level for {field}: '{value}' (expected low, med or high)")]
    InvalidLevel { field: String, value: String },

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Value for {field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Policy mismatch for {field}: this policy expects {expected}")]
    PolicyMismatch { field: String, expected: String },

    #[error("Unknown scoring policy: {0}")]
    UnknownPolicy(String),

    #[error("Missing answer: {field}")]
    MissingAnswer { field: String },
}

impl ValidationError {
    /// Name of the field that failed validation, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidTime { field, .. }
            | ValidationError::InvalidLevel { field, .. }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::PolicyMismatch { field, .. }
            | ValidationError::MissingAnswer { field } => Some(field),
            ValidationError::UnknownPolicy(_) => None,
        }
    }
}

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Wizard error: {0}")]
    WizardError(String),
}

/// Check that `value` lies in `min..=max`, naming `field` on failure
pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}
