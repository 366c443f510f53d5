//! Raw page interactions and their translation into bus events.

use crate::event_bus::{AppEvent, CloseReason};

/// Something the reader did on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    /// Typing in the search box.
    SearchInput { value: String },
    /// Enter in the search box or the search button.
    SearchSubmit { value: String },
    SearchClear,
    CategoryClick { category: String },
    BookClick { book_id: i64 },
    SaveBookClick { book_id: i64 },
    ModalCloseClick,
    /// Click that landed on the overlay itself, not the modal content.
    OverlayClick,
    KeyDown { key: String },
    SidebarToggleClick,
    ThemeToggleClick,
    ThemeSelect { theme: String },
    NavClick { section: String },
    RetryClick,
    /// The page is going away.
    Unload,
}

/// Bus event for a page interaction that maps one-to-one.
///
/// Typing, saving books, retry, Escape and unload need controller state
/// and return `None` here.
pub fn to_app_event(event: &DomEvent) -> Option<AppEvent> {
    let mapped = match event {
        DomEvent::SearchSubmit { value } => AppEvent::UiSearchPerform {
            query: value.trim().to_string(),
        },
        DomEvent::SearchClear => AppEvent::UiSearchClear,
        DomEvent::CategoryClick { category } => AppEvent::UiCategorySelect {
            category: category.clone(),
        },
        DomEvent::BookClick { book_id } => AppEvent::UiBookSelect { book_id: *book_id },
        DomEvent::ModalCloseClick => AppEvent::UiModalClose {
            reason: CloseReason::CloseButton,
        },
        DomEvent::OverlayClick => AppEvent::UiModalClose {
            reason: CloseReason::OverlayClick,
        },
        DomEvent::SidebarToggleClick => AppEvent::UiSidebarToggle,
        DomEvent::ThemeToggleClick => AppEvent::UiThemeToggle,
        DomEvent::ThemeSelect { theme } => AppEvent::UiThemeSet {
            theme: theme.clone(),
        },
        DomEvent::NavClick { section } => AppEvent::UiNavigationChange {
            section: section.clone(),
        },
        DomEvent::SearchInput { .. }
        | DomEvent::SaveBookClick { .. }
        | DomEvent::KeyDown { .. }
        | DomEvent::RetryClick
        | DomEvent::Unload => return None,
    };
    Some(mapped)
}
