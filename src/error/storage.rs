//! Persistence errors for the key-value store that backs theme, search
//! history, saved books and settings.
//!
//! Callers swallow these with a warning: losing history must never break
//! browsing.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Storage backend cannot be used at all (no data directory, disabled).
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// Write would exceed the configured quota.
    #[error("Storage quota exceeded for key '{key}' ({size} bytes > {limit} bytes)")]
    QuotaExceeded { key: String, size: usize, limit: usize },

    /// Stored blob could not be decoded.
    #[error("Corrupt value for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Underlying file I/O failed.
    #[error("Storage I/O error at {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

impl StorageError {
    pub fn user_message(&self) -> String {
        match self {
            StorageError::QuotaExceeded { .. } => {
                "Local storage is full; preferences were not saved.".to_string()
            }
            _ => "Saved preferences could not be accessed.".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Unavailable { .. } => "E_STORE_UNAVAILABLE",
            StorageError::QuotaExceeded { .. } => "E_STORE_QUOTA",
            StorageError::Corrupt { .. } => "E_STORE_CORRUPT",
            StorageError::Io { .. } => "E_STORE_IO",
        }
    }
}
