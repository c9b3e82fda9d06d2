//! Configuration validation rules

use crate::errors::TidelineError;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Value is required but missing or empty
    #[error("Field '{field}' is required but missing")]
    Required {
        /// Setting that was blank
        field: String,
    },

    /// Value could not be parsed
    #[error("Field '{field}' has invalid format. Expected: {expected}, got: {actual}")]
    InvalidFormat {
        /// Setting that failed to parse
        field: String,
        /// Shape the setting must have
        expected: String,
        /// Raw value supplied
        actual: String,
    },
}

impl From<ValidationError> for TidelineError {
    fn from(err: ValidationError) -> Self {
        TidelineError::config(err.to_string())
    }
}

/// Fails with [`ValidationError::Required`] when `value` is blank
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parse an unsigned integer setting
pub fn parse_u32(field: &str, raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "unsigned integer".to_string(),
            actual: raw.to_string(),
        })
}
