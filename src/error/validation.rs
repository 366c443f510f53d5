//! Validation errors for filter values, event names and other caller input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Category outside the supported set.
    #[error("Unsupported category '{value}' (supported: {supported})")]
    UnsupportedCategory { value: String, supported: String },

    /// Theme outside the supported set.
    #[error("Unsupported theme '{value}'")]
    UnsupportedTheme { value: String },

    /// Event names must be non-empty.
    #[error("Event name must be a non-empty string")]
    EmptyEventName,

    /// Generic invalid field value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::UnsupportedCategory { value, .. } => {
                format!("'{}' is not a known category.", value)
            }
            ValidationError::UnsupportedTheme { value } => {
                format!("'{}' is not a known theme.", value)
            }
            ValidationError::EmptyEventName => "Internal error: empty event name.".to_string(),
            ValidationError::InvalidField { field, .. } => {
                format!("The value for {} is invalid.", field)
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedCategory { .. } => "E_VAL_CATEGORY",
            ValidationError::UnsupportedTheme { .. } => "E_VAL_THEME",
            ValidationError::EmptyEventName => "E_VAL_EVENT",
            ValidationError::InvalidField { .. } => "E_VAL_FIELD",
        }
    }
}
