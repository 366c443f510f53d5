//! Unified error type for the library catalog.
//!
//! `LibraryError` consolidates the domain errors into a single enum so the
//! API, search and UI layers can categorize, retry and report failures the
//! same way.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::dom::DomError;
use super::format::FormatError;
use super::network::NetworkError;
use super::storage::StorageError;
use super::system::SystemError;
use super::validation::ValidationError;

#[derive(Debug)]
pub enum LibraryError {
    /// Fetch failure or timeout.
    Network(NetworkError),

    /// Payload was not a book array.
    Format(FormatError),

    /// Invalid filter or input value.
    Validation(ValidationError),

    /// Persistence failure.
    Storage(StorageError),

    /// Element cache misuse.
    Dom(DomError),

    /// System/filesystem errors.
    System(SystemError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<LibraryError>,
        context: ErrorContext,
    },
}

impl LibraryError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LibraryError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            LibraryError::Network(_) => ErrorCategory::Network,
            LibraryError::Format(_) => ErrorCategory::Server,
            LibraryError::Validation(_) => ErrorCategory::User,
            LibraryError::Storage(_) => ErrorCategory::Storage,
            LibraryError::Dom(_) => ErrorCategory::Client,
            LibraryError::System(SystemError::AddressInUse { .. }) => {
                ErrorCategory::Configuration
            }
            LibraryError::System(_) => ErrorCategory::System,
            LibraryError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            LibraryError::Network(err) => err.is_retryable(),
            LibraryError::Format(_) => false,
            LibraryError::Validation(_) => false,
            LibraryError::Storage(_) => false,
            LibraryError::Dom(_) => false,
            LibraryError::System(err) => err.is_transient(),
            LibraryError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            LibraryError::Network(err) => err.user_message(),
            LibraryError::Format(err) => err.user_message(),
            LibraryError::Validation(err) => err.user_message(),
            LibraryError::Storage(err) => err.user_message(),
            LibraryError::Dom(err) => err.user_message(),
            LibraryError::System(err) => err.user_message(),
            LibraryError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            LibraryError::Network(err) => err.error_code(),
            LibraryError::Format(err) => err.error_code(),
            LibraryError::Validation(err) => err.error_code(),
            LibraryError::Storage(err) => err.error_code(),
            LibraryError::Dom(err) => err.error_code(),
            LibraryError::System(err) => err.error_code(),
            LibraryError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Short kind name used in error event payloads.
    pub fn kind(&self) -> &'static str {
        match self.inner() {
            LibraryError::Network(_) => "NetworkError",
            LibraryError::Format(_) => "FormatError",
            LibraryError::Validation(_) => "ValidationError",
            LibraryError::Storage(_) => "StorageError",
            LibraryError::Dom(_) => "DomError",
            LibraryError::System(_) => "SystemError",
            LibraryError::WithContext { .. } => "Error",
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        LibraryError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LibraryError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &LibraryError {
        match self {
            LibraryError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    pub fn is_network(&self) -> bool {
        matches!(self.inner(), LibraryError::Network(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self.inner(), LibraryError::Format(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.inner(), LibraryError::Validation(_))
    }
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Network(err) => write!(f, "{}", err),
            LibraryError::Format(err) => write!(f, "{}", err),
            LibraryError::Validation(err) => write!(f, "{}", err),
            LibraryError::Storage(err) => write!(f, "{}", err),
            LibraryError::Dom(err) => write!(f, "{}", err),
            LibraryError::System(err) => write!(f, "{}", err),
            LibraryError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LibraryError::Network(err) => Some(err),
            LibraryError::Format(err) => Some(err),
            LibraryError::Validation(err) => Some(err),
            LibraryError::Storage(err) => Some(err),
            LibraryError::Dom(err) => Some(err),
            LibraryError::System(err) => Some(err),
            LibraryError::WithContext { error, .. } => error.source(),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for LibraryError {
    fn from(err: NetworkError) -> Self {
        LibraryError::Network(err)
    }
}

impl From<FormatError> for LibraryError {
    fn from(err: FormatError) -> Self {
        LibraryError::Format(err)
    }
}

impl From<ValidationError> for LibraryError {
    fn from(err: ValidationError) -> Self {
        LibraryError::Validation(err)
    }
}

impl From<StorageError> for LibraryError {
    fn from(err: StorageError) -> Self {
        LibraryError::Storage(err)
    }
}

impl From<DomError> for LibraryError {
    fn from(err: DomError) -> Self {
        LibraryError::Dom(err)
    }
}

impl From<SystemError> for LibraryError {
    fn from(err: SystemError) -> Self {
        LibraryError::System(err)
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::System(super::system::classify_io_error(err, None, "I/O operation"))
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Format(err.into())
    }
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        LibraryError::Network(super::network::classify_reqwest_error(&err, &url))
    }
}
