//! Event names and typed payloads carried by the event bus.
//!
//! Every event has a stable wire-style name (`"ui:modal:open"`) used for
//! logging, metrics and listener lookup. Application-defined events go
//! through [`AppEvent::Custom`], whose name is validated on construction.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::models::{Book, Category, Theme};
use crate::state::StateKey;

/// A non-empty custom event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomName(String);

impl CustomName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyEventName);
        }
        Ok(Self(name.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Why the modal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    OverlayClick,
    EscapeKey,
    Programmatic,
}

/// Variant of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }
}

/// Listener lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    EventBusError,
    StateChanged,
    StateReset,
    BooksLoaded,
    BooksLoadFailed,
    BooksFiltered,
    FetchBooksRequested,
    CategoriesStatsUpdated,
    SearchQueryChanged,
    SearchQueryCleared,
    SearchResultsReady,
    SearchFailed,
    CategorySelected,
    ThemeChanged,
    DomReady,
    DomElementFound,
    DomElementReplaced,
    DomElementRemoved,
    UiSearchPerform,
    UiSearchClear,
    UiCategorySelect,
    UiBookSelect,
    UiModalOpened,
    UiModalClose,
    UiModalClosed,
    UiSidebarOpen,
    UiSidebarClose,
    UiSidebarToggle,
    UiSidebarOpened,
    UiSidebarClosed,
    UiThemeToggle,
    UiThemeSet,
    UiNavigationChange,
    UiNavigationChanged,
    UiToastShow,
    CoreInitialized,
    CoreInitializationFailed,
    AppStarted,
    AppUnhandledError,
    Custom(CustomName),
}

impl EventName {
    /// Build a custom event name; empty names are rejected.
    pub fn custom(name: impl Into<String>) -> Result<Self, ValidationError> {
        CustomName::new(name).map(EventName::Custom)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventName::EventBusError => "eventbus:error",
            EventName::StateChanged => "state:changed",
            EventName::StateReset => "state:reset",
            EventName::BooksLoaded => "books:loaded",
            EventName::BooksLoadFailed => "books:load_failed",
            EventName::BooksFiltered => "books:filtered",
            EventName::FetchBooksRequested => "app:fetch_books_requested",
            EventName::CategoriesStatsUpdated => "categories:stats_updated",
            EventName::SearchQueryChanged => "search:query:changed",
            EventName::SearchQueryCleared => "search:query:cleared",
            EventName::SearchResultsReady => "search:results:ready",
            EventName::SearchFailed => "search:failed",
            EventName::CategorySelected => "category:selected",
            EventName::ThemeChanged => "theme:changed",
            EventName::DomReady => "dom:ready",
            EventName::DomElementFound => "dom:element_found",
            EventName::DomElementReplaced => "dom:element_replaced",
            EventName::DomElementRemoved => "dom:element_removed",
            EventName::UiSearchPerform => "ui:search:perform",
            EventName::UiSearchClear => "ui:search:clear",
            EventName::UiCategorySelect => "ui:category:select",
            EventName::UiBookSelect => "ui:book:select",
            EventName::UiModalOpened => "ui:modal:opened",
            EventName::UiModalClose => "ui:modal:close",
            EventName::UiModalClosed => "ui:modal:closed",
            EventName::UiSidebarOpen => "ui:sidebar:open",
            EventName::UiSidebarClose => "ui:sidebar:close",
            EventName::UiSidebarToggle => "ui:sidebar:toggle",
            EventName::UiSidebarOpened => "ui:sidebar:opened",
            EventName::UiSidebarClosed => "ui:sidebar:closed",
            EventName::UiThemeToggle => "ui:theme:toggle",
            EventName::UiThemeSet => "ui:theme:set",
            EventName::UiNavigationChange => "ui:navigation:change",
            EventName::UiNavigationChanged => "ui:navigation:changed",
            EventName::UiToastShow => "ui:toast:show",
            EventName::CoreInitialized => "core:initialized",
            EventName::CoreInitializationFailed => "core:initialization_failed",
            EventName::AppStarted => "app:started",
            EventName::AppUnhandledError => "app:unhandled_error",
            EventName::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payloads. One variant per [`EventName`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A handler failed while processing `original_event`.
    EventBusError {
        original_event: String,
        listener_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
    StateChanged {
        changed_keys: Vec<StateKey>,
    },
    StateReset {
        keep_user_settings: bool,
    },
    BooksLoaded {
        count: usize,
    },
    BooksLoadFailed {
        kind: String,
        message: String,
        retryable: bool,
    },
    BooksFiltered {
        count: usize,
        total: usize,
    },
    FetchBooksRequested,
    CategoriesStatsUpdated {
        counts: BTreeMap<Category, usize>,
    },
    /// `submit` is false for debounced typing, true for an explicit search.
    SearchQueryChanged {
        query: String,
        submit: bool,
    },
    SearchQueryCleared,
    SearchResultsReady {
        query: String,
        category: Category,
        results: Arc<Vec<Book>>,
        from_cache: bool,
    },
    SearchFailed {
        query: String,
        message: String,
    },
    CategorySelected {
        category: Category,
    },
    ThemeChanged {
        theme: Theme,
    },
    DomReady {
        found: usize,
        placeholders: usize,
    },
    DomElementFound {
        key: String,
    },
    DomElementReplaced {
        key: String,
    },
    DomElementRemoved {
        key: String,
    },
    UiSearchPerform {
        query: String,
    },
    UiSearchClear,
    /// Raw category value from the page; validated by the receiver.
    UiCategorySelect {
        category: String,
    },
    UiBookSelect {
        book_id: i64,
    },
    UiModalOpened {
        book_id: i64,
    },
    UiModalClose {
        reason: CloseReason,
    },
    UiModalClosed {
        reason: CloseReason,
    },
    UiSidebarOpen,
    UiSidebarClose,
    UiSidebarToggle,
    UiSidebarOpened,
    UiSidebarClosed,
    UiThemeToggle,
    UiThemeSet {
        theme: String,
    },
    UiNavigationChange {
        section: String,
    },
    UiNavigationChanged {
        section: String,
    },
    UiToastShow {
        kind: ToastKind,
        message: String,
    },
    CoreInitialized,
    CoreInitializationFailed {
        message: String,
    },
    AppStarted,
    AppUnhandledError {
        message: String,
    },
    Custom {
        name: CustomName,
        payload: serde_json::Value,
    },
}

impl AppEvent {
    /// Build a custom event; empty names are rejected.
    pub fn custom(
        name: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<Self, ValidationError> {
        Ok(AppEvent::Custom {
            name: CustomName::new(name)?,
            payload,
        })
    }

    pub fn name(&self) -> EventName {
        match self {
            AppEvent::EventBusError { .. } => EventName::EventBusError,
            AppEvent::StateChanged { .. } => EventName::StateChanged,
            AppEvent::StateReset { .. } => EventName::StateReset,
            AppEvent::BooksLoaded { .. } => EventName::BooksLoaded,
            AppEvent::BooksLoadFailed { .. } => EventName::BooksLoadFailed,
            AppEvent::BooksFiltered { .. } => EventName::BooksFiltered,
            AppEvent::FetchBooksRequested => EventName::FetchBooksRequested,
            AppEvent::CategoriesStatsUpdated { .. } => EventName::CategoriesStatsUpdated,
            AppEvent::SearchQueryChanged { .. } => EventName::SearchQueryChanged,
            AppEvent::SearchQueryCleared => EventName::SearchQueryCleared,
            AppEvent::SearchResultsReady { .. } => EventName::SearchResultsReady,
            AppEvent::SearchFailed { .. } => EventName::SearchFailed,
            AppEvent::CategorySelected { .. } => EventName::CategorySelected,
            AppEvent::ThemeChanged { .. } => EventName::ThemeChanged,
            AppEvent::DomReady { .. } => EventName::DomReady,
            AppEvent::DomElementFound { .. } => EventName::DomElementFound,
            AppEvent::DomElementReplaced { .. } => EventName::DomElementReplaced,
            AppEvent::DomElementRemoved { .. } => EventName::DomElementRemoved,
            AppEvent::UiSearchPerform { .. } => EventName::UiSearchPerform,
            AppEvent::UiSearchClear => EventName::UiSearchClear,
            AppEvent::UiCategorySelect { .. } => EventName::UiCategorySelect,
            AppEvent::UiBookSelect { .. } => EventName::UiBookSelect,
            AppEvent::UiModalOpened { .. } => EventName::UiModalOpened,
            AppEvent::UiModalClose { .. } => EventName::UiModalClose,
            AppEvent::UiModalClosed { .. } => EventName::UiModalClosed,
            AppEvent::UiSidebarOpen => EventName::UiSidebarOpen,
            AppEvent::UiSidebarClose => EventName::UiSidebarClose,
            AppEvent::UiSidebarToggle => EventName::UiSidebarToggle,
            AppEvent::UiSidebarOpened => EventName::UiSidebarOpened,
            AppEvent::UiSidebarClosed => EventName::UiSidebarClosed,
            AppEvent::UiThemeToggle => EventName::UiThemeToggle,
            AppEvent::UiThemeSet { .. } => EventName::UiThemeSet,
            AppEvent::UiNavigationChange { .. } => EventName::UiNavigationChange,
            AppEvent::UiNavigationChanged { .. } => EventName::UiNavigationChanged,
            AppEvent::UiToastShow { .. } => EventName::UiToastShow,
            AppEvent::CoreInitialized => EventName::CoreInitialized,
            AppEvent::CoreInitializationFailed { .. } => EventName::CoreInitializationFailed,
            AppEvent::AppStarted => EventName::AppStarted,
            AppEvent::AppUnhandledError { .. } => EventName::AppUnhandledError,
            AppEvent::Custom { name, .. } => EventName::Custom(name.clone()),
        }
    }
}
