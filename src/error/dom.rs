//! Element cache errors.
//!
//! Missing elements are never an error (a placeholder is returned). Only
//! programming mistakes surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomError {
    /// `get` was called before `init`.
    #[error("Element cache not initialized (requested '{key}')")]
    NotReady { key: String },

    /// The cache has been destroyed.
    #[error("Element cache destroyed")]
    Destroyed,

    /// Selector could not be parsed.
    #[error("Invalid selector '{selector}'")]
    InvalidSelector { selector: String },
}

impl DomError {
    pub fn user_message(&self) -> String {
        "The page failed to initialize. Please reload.".to_string()
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DomError::NotReady { .. } => "E_DOM_NOT_READY",
            DomError::Destroyed => "E_DOM_DESTROYED",
            DomError::InvalidSelector { .. } => "E_DOM_SELECTOR",
        }
    }
}
