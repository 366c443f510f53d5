//! The application state record and its typed keys and updates.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Book, Category, Theme};

pub const STATE_VERSION: &str = "1.0.0";

/// Everything the UI renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub books: Arc<Vec<Book>>,
    /// Derived view of `books` for the current category and search term.
    pub filtered_books: Arc<Vec<Book>>,
    pub selected_book: Option<Book>,
    pub is_loading: bool,
    pub has_error: bool,
    pub error_message: String,
    pub current_category: Category,
    pub search_term: String,
    pub search_results: Arc<Vec<Book>>,
    pub theme: Theme,
    pub sidebar_open: bool,
    pub modal_open: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub version: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            books: Arc::new(Vec::new()),
            filtered_books: Arc::new(Vec::new()),
            selected_book: None,
            is_loading: false,
            has_error: false,
            error_message: String::new(),
            current_category: Category::All,
            search_term: String::new(),
            search_results: Arc::new(Vec::new()),
            theme: Theme::Light,
            sidebar_open: false,
            modal_open: false,
            last_update: None,
            version: STATE_VERSION.to_string(),
        }
    }
}

/// Settable state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Books,
    FilteredBooks,
    SelectedBook,
    IsLoading,
    HasError,
    ErrorMessage,
    CurrentCategory,
    SearchTerm,
    SearchResults,
    Theme,
    SidebarOpen,
    ModalOpen,
}

impl StateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Books => "books",
            StateKey::FilteredBooks => "filteredBooks",
            StateKey::SelectedBook => "selectedBook",
            StateKey::IsLoading => "isLoading",
            StateKey::HasError => "hasError",
            StateKey::ErrorMessage => "errorMessage",
            StateKey::CurrentCategory => "currentCategory",
            StateKey::SearchTerm => "searchTerm",
            StateKey::SearchResults => "searchResults",
            StateKey::Theme => "theme",
            StateKey::SidebarOpen => "sidebarOpen",
            StateKey::ModalOpen => "modalOpen",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Books(Arc<Vec<Book>>),
    FilteredBooks(Arc<Vec<Book>>),
    SelectedBook(Option<Book>),
    IsLoading(bool),
    HasError(bool),
    ErrorMessage(String),
    CurrentCategory(Category),
    SearchTerm(String),
    SearchResults(Arc<Vec<Book>>),
    Theme(Theme),
    SidebarOpen(bool),
    ModalOpen(bool),
}

impl StateUpdate {
    pub fn key(&self) -> StateKey {
        match self {
            StateUpdate::Books(_) => StateKey::Books,
            StateUpdate::FilteredBooks(_) => StateKey::FilteredBooks,
            StateUpdate::SelectedBook(_) => StateKey::SelectedBook,
            StateUpdate::IsLoading(_) => StateKey::IsLoading,
            StateUpdate::HasError(_) => StateKey::HasError,
            StateUpdate::ErrorMessage(_) => StateKey::ErrorMessage,
            StateUpdate::CurrentCategory(_) => StateKey::CurrentCategory,
            StateUpdate::SearchTerm(_) => StateKey::SearchTerm,
            StateUpdate::SearchResults(_) => StateKey::SearchResults,
            StateUpdate::Theme(_) => StateKey::Theme,
            StateUpdate::SidebarOpen(_) => StateKey::SidebarOpen,
            StateUpdate::ModalOpen(_) => StateKey::ModalOpen,
        }
    }

    pub(crate) fn apply(self, state: &mut AppState) {
        match self {
            StateUpdate::Books(v) => state.books = v,
            StateUpdate::FilteredBooks(v) => state.filtered_books = v,
            StateUpdate::SelectedBook(v) => state.selected_book = v,
            StateUpdate::IsLoading(v) => state.is_loading = v,
            StateUpdate::HasError(v) => state.has_error = v,
            StateUpdate::ErrorMessage(v) => state.error_message = v,
            StateUpdate::CurrentCategory(v) => state.current_category = v,
            StateUpdate::SearchTerm(v) => state.search_term = v,
            StateUpdate::SearchResults(v) => state.search_results = v,
            StateUpdate::Theme(v) => state.theme = v,
            StateUpdate::SidebarOpen(v) => state.sidebar_open = v,
            StateUpdate::ModalOpen(v) => state.modal_open = v,
        }
    }
}
