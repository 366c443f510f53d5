//! Error context for enriched error information.
//!
//! Context records which operation and component failed and how many
//! attempts were made, so a surfaced error carries enough to debug it.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging and recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,

    /// Number of attempts made before this error was surfaced.
    pub retry_count: u32,

    /// Component where the error originated (e.g. `api_client`, `search`).
    pub component: Option<String>,

    /// Free-form key details, such as the URL or the event name.
    pub detail: Option<String>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            timestamp: Utc::now(),
            retry_count: 0,
            component: None,
            detail: None,
        }
    }

    /// Set the retry count for this context.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the component for this context.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attach a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Format as `key=value` pairs for structured log lines.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref component) = self.component {
            parts.push(format!("component={}", component));
        }

        if let Some(ref detail) = self.detail {
            parts.push(format!("detail={}", detail));
        }

        if self.retry_count > 0 {
            parts.push(format!("retry_count={}", self.retry_count));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref component) = self.component {
            write!(f, " component={}", component)?;
        }

        if self.retry_count > 0 {
            write!(f, " retry={}", self.retry_count)?;
        }

        Ok(())
    }
}
