//! Options, results and handler types for the event bus.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::error::LibraryError;

use super::events::AppEvent;

/// Failure returned by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<LibraryError> for HandlerError {
    fn from(err: LibraryError) -> Self {
        Self::new(err.to_string())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

pub(crate) type SyncHandler = Arc<dyn Fn(&AppEvent) -> HandlerResult + Send + Sync>;
pub(crate) type AsyncHandler =
    Arc<dyn Fn(AppEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

impl Handler {
    pub(crate) fn is_async(&self) -> bool {
        matches!(self, Handler::Async(_))
    }
}

/// Per-subscription options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Remove the listener after its first invocation.
    pub once: bool,
    /// Higher runs first. Equal priorities run in subscription order.
    pub priority: i32,
}

impl SubscribeOptions {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Options for a single publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOptions {
    /// Stop at the first failing handler (synchronous dispatch only).
    pub stop_on_error: bool,
    /// Per-handler timeout for asynchronous dispatch; the bus default when `None`.
    pub timeout: Option<Duration>,
}

impl PublishOptions {
    pub fn stop_on_error() -> Self {
        Self {
            stop_on_error: true,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A handler that completed.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub listener_id: String,
    pub elapsed: Duration,
}

/// A handler that failed, panicked or timed out.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub listener_id: String,
    pub error: String,
    pub elapsed: Duration,
}

/// Aggregate result of a publish.
///
/// `success` is false only when dispatch stopped early because of
/// `stop_on_error`; individual failures are listed in `errors`.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub success: bool,
    pub results: Vec<HandlerOutcome>,
    pub errors: Vec<HandlerFailure>,
    pub executed_count: usize,
    pub skipped_count: usize,
}

impl PublishResult {
    pub(crate) fn empty() -> Self {
        Self {
            success: true,
            results: Vec::new(),
            errors: Vec::new(),
            executed_count: 0,
            skipped_count: 0,
        }
    }
}

/// Description of a registered listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerInfo {
    pub id: String,
    pub priority: i32,
    pub once: bool,
    pub is_async: bool,
    pub subscribed_at: DateTime<Utc>,
}

/// Bus-wide counters.
#[derive(Debug, Clone, PartialEq)]
pub struct BusStats {
    pub id: String,
    pub uptime: Duration,
    pub total_events: u64,
    pub total_listeners: usize,
    pub active_events: usize,
    pub event_counts: BTreeMap<String, u64>,
    pub error_counts: BTreeMap<String, u64>,
}
