//! Payload format errors.
//!
//! The book endpoint must answer with a JSON array. Anything else (an
//! object, invalid JSON, non-UTF-8 bytes) is a format error and is not
//! retried.

use thiserror::Error;

/// The response arrived but could not be interpreted as a book list.
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// Body was not valid JSON.
    #[error("Invalid JSON in response: {message}")]
    InvalidJson { message: String },

    /// Body was valid JSON but not an array.
    #[error("Expected a JSON array of books, got {found}")]
    NotAnArray { found: String },

    /// A single book record was expected but something else arrived.
    #[error("Expected a book object, got {found}")]
    NotAnObject { found: String },
}

impl FormatError {
    /// Describe a JSON value's kind for error messages.
    pub fn kind_of(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        }
        .to_string()
    }

    pub fn user_message(&self) -> String {
        "The server sent book data in an unexpected format.".to_string()
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FormatError::InvalidJson { .. } => "E_FMT_JSON",
            FormatError::NotAnArray { .. } => "E_FMT_ARRAY",
            FormatError::NotAnObject { .. } => "E_FMT_OBJECT",
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::InvalidJson {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of() {
        assert_eq!(FormatError::kind_of(&serde_json::json!({"a": 1})), "an object");
        assert_eq!(FormatError::kind_of(&serde_json::json!(null)), "null");
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let fmt: FormatError = err.into();
        assert_eq!(fmt.error_code(), "E_FMT_JSON");
    }
}
