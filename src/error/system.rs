//! System-related error types.
//!
//! Filesystem access for the metadata file and storage directory, port
//! binding, and waits that ran out of time.

use std::path::PathBuf;

use thiserror::Error;

/// System-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum SystemError {
    /// File not found.
    #[error("File not found: {path:?}")]
    FileNotFound { path: PathBuf },

    /// Permission denied for file/directory operation.
    #[error("Permission denied: cannot {operation} {path:?}")]
    PermissionDenied { path: PathBuf, operation: String },

    /// Listening address already taken.
    #[error("Address {addr} is already in use")]
    AddressInUse { addr: String },

    /// Generic I/O error.
    #[error("I/O error during {operation}: {message}")]
    IoError {
        operation: String,
        path: Option<PathBuf>,
        message: String,
    },

    /// A wait (e.g. for a bus event) ran out of time.
    #[error("Timed out waiting for {what} after {duration_ms} ms")]
    Timeout { what: String, duration_ms: u64 },

    /// Could not determine the per-user data directory.
    #[error("Could not determine data directory")]
    NoDataDirectory,

    /// Generic system error.
    #[error("System error: {message}")]
    Other { message: String },
}

impl SystemError {
    /// Check if this error might be transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, SystemError::Timeout { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SystemError::FileNotFound { path } => {
                format!("File not found: '{}'", path.display())
            }
            SystemError::PermissionDenied { path, operation } => format!(
                "Permission denied: cannot {} '{}'. Check file permissions.",
                operation,
                path.display()
            ),
            SystemError::AddressInUse { addr } => format!(
                "{} is already in use. Try a different port, e.g. PORT=3001.",
                addr
            ),
            SystemError::IoError { operation, .. } => {
                format!("A file operation failed while trying to {}.", operation)
            }
            SystemError::Timeout { what, .. } => format!("Timed out waiting for {}.", what),
            SystemError::NoDataDirectory => {
                "Could not find a directory to store preferences in.".to_string()
            }
            SystemError::Other { message } => format!("System error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SystemError::FileNotFound { .. } => "E_SYS_NOT_FOUND",
            SystemError::PermissionDenied { .. } => "E_SYS_PERMISSION",
            SystemError::AddressInUse { .. } => "E_SYS_ADDR_IN_USE",
            SystemError::IoError { .. } => "E_SYS_IO",
            SystemError::Timeout { .. } => "E_SYS_TIMEOUT",
            SystemError::NoDataDirectory => "E_SYS_NO_DATA_DIR",
            SystemError::Other { .. } => "E_SYS_OTHER",
        }
    }
}

/// Classify an std::io::Error into a SystemError.
pub fn classify_io_error(
    err: std::io::Error,
    path: Option<PathBuf>,
    operation: &str,
) -> SystemError {
    use std::io::ErrorKind;

    match (err.kind(), path) {
        (ErrorKind::NotFound, Some(path)) => SystemError::FileNotFound { path },
        (ErrorKind::PermissionDenied, Some(path)) => SystemError::PermissionDenied {
            path,
            operation: operation.to_string(),
        },
        (ErrorKind::AddrInUse, _) => SystemError::AddressInUse {
            addr: err.to_string(),
        },
        (_, path) => SystemError::IoError {
            operation: operation.to_string(),
            path,
            message: err.to_string(),
        },
    }
}
