//! Network-related error types.
//!
//! Raised by the API client when the book endpoint cannot be reached, does
//! not answer in time, or answers with a non-2xx status.

use thiserror::Error;

/// Network-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// Connection to the server failed.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request did not complete within the configured timeout.
    #[error("{operation} timed out after {duration_ms} ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// HTTP status error (non-2xx response).
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// Every attempt failed; `source` is the last failure.
    #[error("Request to '{url}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        source: Box<NetworkError>,
    },

    /// Request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Generic network error.
    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            // The caller already retried; offering another manual retry is still useful.
            NetworkError::RetriesExhausted { source, .. } => source.is_retryable(),
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Whether the underlying failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            NetworkError::Timeout { .. } => true,
            NetworkError::RetriesExhausted { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to reach the library server. Please make sure it is running.".to_string()
            }
            NetworkError::Timeout { duration_ms, .. } => format!(
                "The library server did not respond within {} seconds.",
                duration_ms / 1000
            ),
            NetworkError::HttpStatus { status, .. } => match *status {
                404 => "The book list could not be found on the server.".to_string(),
                400 => "The server's book list is malformed.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::RetriesExhausted { attempts, source, .. } => format!(
                "{} (gave up after {} attempts)",
                source.user_message(),
                attempts
            ),
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::RetriesExhausted { .. } => "E_NET_RETRIES",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

/// Classify a reqwest error into a NetworkError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            operation: "HTTP request".to_string(),
            duration_ms: 0,
        }
    } else if err.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if let Some(status) = err.status() {
        NetworkError::HttpStatus {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        NetworkError::Other {
            message: err.to_string(),
        }
    }
}
