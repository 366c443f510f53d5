//! The UI controller: page interactions in, page updates out.
//!
//! Raw [`DomEvent`]s become bus events; bus events and state changes become
//! element updates. The controller keeps a local mirror of the UI flags
//! (sidebar, theme, section, modal) and writes every change through to the
//! state store, so the two never disagree.

use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use crate::config::UiConfig;
use crate::dom::{ElementCache, ElementHandle};
use crate::event_bus::{
    AppEvent, CloseReason, EventBus, EventName, HandlerResult, Subscription, ToastKind,
};
use crate::models::{Book, Theme};
use crate::search::SearchManager;
use crate::state::{AppState, StateKey, StateStore, StateSubscription};
use crate::traits::KeyValueStore;
use crate::util::lock;

use super::debounce::SearchDebouncer;
use super::dom_event::{to_app_event, DomEvent};
use super::library::{MyLibrary, Settings};
use super::modal::ModalState;
use super::render::{self, ModalFields};
use super::toast::ToastQueue;

pub const HOME_SECTION: &str = "home";
pub const LIBRARY_SECTION: &str = "library";

/// Local mirror of the UI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct UiFlags {
    pub sidebar_open: bool,
    pub theme: Theme,
    pub section: String,
    pub modal: ModalState,
}

struct ControllerInner {
    bus: EventBus,
    store: StateStore,
    elements: ElementCache,
    search: SearchManager,
    storage: Option<Arc<dyn KeyValueStore>>,
    debouncer: SearchDebouncer,
    flags: Mutex<UiFlags>,
    toasts: Mutex<ToastQueue>,
    library: Mutex<MyLibrary>,
    settings: Mutex<Settings>,
    min_query_length: usize,
    subscriptions: Mutex<Vec<Subscription>>,
    state_subscriptions: Mutex<Vec<StateSubscription>>,
}

#[derive(Clone)]
pub struct UiController {
    inner: Arc<ControllerInner>,
}

impl UiController {
    pub fn new(
        bus: EventBus,
        store: StateStore,
        elements: ElementCache,
        search: SearchManager,
        config: &UiConfig,
        storage: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        let (library, settings) = match &storage {
            Some(storage) => (MyLibrary::load(storage.clone()), Settings::load(storage.as_ref())),
            None => (MyLibrary::new(), Settings::default()),
        };
        let flags = UiFlags {
            sidebar_open: store.is_sidebar_open(),
            theme: store.theme(),
            section: HOME_SECTION.to_string(),
            modal: ModalState::Closed,
        };

        Self {
            inner: Arc::new(ControllerInner {
                debouncer: SearchDebouncer::new(bus.clone(), config.search_debounce),
                bus,
                store,
                elements,
                search,
                storage,
                flags: Mutex::new(flags),
                toasts: Mutex::new(ToastQueue::new(config.max_toasts, config.toast_duration)),
                library: Mutex::new(library),
                settings: Mutex::new(settings),
                min_query_length: config.search_min_length,
                subscriptions: Mutex::new(Vec::new()),
                state_subscriptions: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to the bus and the store, then render the initial page.
    /// The element cache must be initialized first.
    pub fn initialize(&self) {
        {
            let mut subscriptions = lock(&self.inner.subscriptions);
            if !subscriptions.is_empty() {
                return;
            }
            let weak = Arc::downgrade(&self.inner);
            for event in [
                EventName::UiSearchPerform,
                EventName::UiSearchClear,
                EventName::UiCategorySelect,
                EventName::UiBookSelect,
                EventName::UiModalClose,
                EventName::UiSidebarOpen,
                EventName::UiSidebarClose,
                EventName::UiSidebarToggle,
                EventName::UiThemeToggle,
                EventName::UiThemeSet,
                EventName::UiNavigationChange,
                EventName::UiToastShow,
                EventName::CategorySelected,
                EventName::CategoriesStatsUpdated,
                EventName::SearchFailed,
                EventName::BooksLoadFailed,
                EventName::StateReset,
            ] {
                let weak = weak.clone();
                subscriptions.push(self.inner.bus.subscribe(event, move |event| {
                    match weak.upgrade() {
                        Some(inner) => UiController { inner }.on_bus_event(event),
                        None => Ok(()),
                    }
                }));
            }
        }

        {
            let weak = Arc::downgrade(&self.inner);
            let subscription = self.inner.store.subscribe(
                &[StateKey::FilteredBooks, StateKey::IsLoading, StateKey::Books],
                move |key, state| match weak.upgrade() {
                    Some(inner) => {
                        UiController { inner }.on_state_change(key, state);
                        Ok(())
                    }
                    None => Ok(()),
                },
            );
            lock(&self.inner.state_subscriptions).push(subscription);
        }

        let flags = self.flags();
        self.apply_theme(flags.theme);
        if let Some(sidebar) = self.element("sidebar") {
            render::render_sidebar(&sidebar, flags.sidebar_open);
        }
        if let Some(list) = self.element("categoryList") {
            let counts = crate::search::category_counts(&self.inner.store.books());
            render::render_category_list(&list, &counts, self.inner.store.current_category());
        }
        if let Some(overlay) = self.element("modalOverlay") {
            render::hide_modal(&overlay);
        }
        render::mark_active_section(&self.body(), &flags.section);
        tracing::debug!("UI controller initialized");
    }

    /// Translate a page interaction.
    pub fn handle_dom_event(&self, event: DomEvent) {
        if let Some(mapped) = to_app_event(&event) {
            self.inner.bus.publish(mapped);
            return;
        }

        match event {
            DomEvent::SearchInput { value } => self.on_search_input(&value),
            DomEvent::SaveBookClick { book_id } => self.toggle_saved(book_id),
            DomEvent::KeyDown { key } if key == "Escape" => {
                let flags = self.flags();
                if flags.modal.is_open() {
                    self.inner.bus.publish(AppEvent::UiModalClose {
                        reason: CloseReason::EscapeKey,
                    });
                } else if flags.sidebar_open {
                    self.inner.bus.publish(AppEvent::UiSidebarClose);
                }
            }
            DomEvent::KeyDown { .. } => {}
            DomEvent::RetryClick => {
                tracing::info!("Retry requested from the page");
                self.inner.bus.publish(AppEvent::FetchBooksRequested);
            }
            DomEvent::Unload => {
                lock(&self.inner.flags).modal.unload();
                self.destroy();
            }
            // Mapped above
            _ => {}
        }
    }

    fn on_bus_event(&self, event: &AppEvent) -> HandlerResult {
        match event {
            AppEvent::UiSearchPerform { query } => {
                self.inner.debouncer.cancel();
                if query.trim().is_empty() {
                    self.inner.bus.publish(AppEvent::SearchQueryCleared);
                } else {
                    self.inner.bus.publish(AppEvent::SearchQueryChanged {
                        query: query.clone(),
                        submit: true,
                    });
                }
            }
            AppEvent::UiSearchClear => {
                self.inner.debouncer.cancel();
                if let Some(input) = self.element("searchInput") {
                    input.set_attr("value", "");
                }
                self.inner.bus.publish(AppEvent::SearchQueryCleared);
            }
            AppEvent::UiCategorySelect { category } => {
                // Failures are reported through search:failed
                let _ = self.inner.search.select_category(category);
            }
            AppEvent::CategorySelected { category } => {
                if let Some(list) = self.element("categoryList") {
                    render::mark_active_category(&list, *category);
                }
            }
            AppEvent::CategoriesStatsUpdated { counts } => {
                if let Some(list) = self.element("categoryList") {
                    render::render_category_counts(
                        &list,
                        counts,
                        self.inner.store.current_category(),
                    );
                }
            }
            AppEvent::UiBookSelect { book_id } => self.open_book(*book_id),
            AppEvent::UiModalClose { reason } => self.close_modal(*reason),
            AppEvent::UiSidebarOpen => self.set_sidebar(true),
            AppEvent::UiSidebarClose => self.set_sidebar(false),
            AppEvent::UiSidebarToggle => {
                let open = self.flags().sidebar_open;
                self.set_sidebar(!open);
            }
            AppEvent::UiThemeToggle => {
                let theme = self.flags().theme.toggled();
                self.set_theme(theme);
            }
            AppEvent::UiThemeSet { theme } => match Theme::parse(theme) {
                Ok(theme) => self.set_theme(theme),
                Err(e) => self.show_toast(ToastKind::Warning, e.user_message()),
            },
            AppEvent::UiNavigationChange { section } => self.navigate(section),
            AppEvent::UiToastShow { kind, message } => self.show_toast(*kind, message.clone()),
            AppEvent::SearchFailed { message, .. } => {
                self.show_toast(ToastKind::Warning, message.clone())
            }
            AppEvent::BooksLoadFailed {
                message, retryable, ..
            } => self.show_error(message, *retryable),
            AppEvent::StateReset { .. } => self.sync_from_store(),
            _ => {}
        }
        Ok(())
    }

    /// Re-read the mirrored flags after the store was reset underneath us.
    fn sync_from_store(&self) {
        self.inner.debouncer.cancel();
        let state = self.inner.store.snapshot();
        let flags = {
            let mut flags = lock(&self.inner.flags);
            flags.sidebar_open = state.sidebar_open;
            flags.theme = state.theme;
            if flags.modal.is_open() && !state.modal_open {
                flags.modal = ModalState::Closed;
            }
            flags.clone()
        };

        self.apply_theme(flags.theme);
        if let Some(sidebar) = self.element("sidebar") {
            render::render_sidebar(&sidebar, flags.sidebar_open);
        }
        if !flags.modal.is_open() {
            if let Some(overlay) = self.element("modalOverlay") {
                render::hide_modal(&overlay);
            }
        }
        if let Some(list) = self.element("categoryList") {
            let counts = crate::search::category_counts(&state.books);
            render::render_category_list(&list, &counts, state.current_category);
        }
        tracing::debug!("UI flags resynced after state reset");
    }

    fn on_state_change(&self, key: StateKey, state: &AppState) {
        match key {
            StateKey::FilteredBooks if !state.has_error => self.refresh_grid(),
            StateKey::IsLoading => {
                if let Some(screen) = self.element("loadingScreen") {
                    render::render_loading(&screen, state.is_loading);
                }
            }
            StateKey::Books => {
                if let Some(counter) = self.element("totalBooksCount") {
                    render::render_total(&counter, state.books.len());
                }
            }
            _ => {}
        }
    }

    fn on_search_input(&self, value: &str) {
        if !lock(&self.inner.settings).realtime_search {
            return;
        }
        let query = value.trim();
        if query.is_empty() {
            self.inner.debouncer.cancel();
            self.inner.bus.publish(AppEvent::SearchQueryCleared);
        } else if query.chars().count() >= self.inner.min_query_length {
            self.inner.debouncer.request(query);
        }
    }

    fn open_book(&self, book_id: i64) {
        let Some(book) = self.inner.store.find_book(book_id) else {
            tracing::warn!("Book {} selected but not loaded", book_id);
            self.show_toast(ToastKind::Error, "That book is no longer available.");
            return;
        };

        if !lock(&self.inner.flags).modal.open(book_id) {
            return;
        }
        self.inner.store.set_selected_book(Some(book.clone()));
        self.inner.store.set_modal_open(true);

        let similar = self.inner.search.similar_books(book_id);
        if let Some(fields) = self.modal_fields() {
            render::render_modal(&fields, &book, &similar);
        }
        tracing::debug!("Opened book {} ({} similar)", book_id, similar.len());
        self.inner.bus.publish(AppEvent::UiModalOpened { book_id });
    }

    fn close_modal(&self, reason: CloseReason) {
        if !lock(&self.inner.flags).modal.close(reason) {
            return;
        }
        self.inner.store.set_modal_open(false);
        self.inner.store.set_selected_book(None);
        if let Some(overlay) = self.element("modalOverlay") {
            render::hide_modal(&overlay);
        }
        self.inner.bus.publish(AppEvent::UiModalClosed { reason });
    }

    fn set_sidebar(&self, open: bool) {
        lock(&self.inner.flags).sidebar_open = open;
        self.inner.store.set_sidebar_open(open);
        if let Some(sidebar) = self.element("sidebar") {
            render::render_sidebar(&sidebar, open);
        }
        self.inner.bus.publish(if open {
            AppEvent::UiSidebarOpened
        } else {
            AppEvent::UiSidebarClosed
        });
    }

    fn set_theme(&self, theme: Theme) {
        lock(&self.inner.flags).theme = theme;
        self.inner.store.set_theme(theme);
        self.apply_theme(theme);
        self.inner.bus.publish(AppEvent::ThemeChanged { theme });
    }

    fn apply_theme(&self, theme: Theme) {
        let (Some(icon), Some(text)) = (self.element("themeIcon"), self.element("themeText")) else {
            return;
        };
        render::apply_theme(&self.body(), &icon, &text, theme);
    }

    fn navigate(&self, section: &str) {
        let section = section.trim();
        if section.is_empty() {
            return;
        }
        lock(&self.inner.flags).section = section.to_string();
        render::mark_active_section(&self.body(), section);
        self.refresh_grid();
        self.inner.bus.publish(AppEvent::UiNavigationChanged {
            section: section.to_string(),
        });
    }

    fn toggle_saved(&self, book_id: i64) {
        let saved = lock(&self.inner.library).toggle(book_id);
        self.show_toast(
            ToastKind::Success,
            if saved {
                "Added to my library"
            } else {
                "Removed from my library"
            },
        );
        self.refresh_grid();
    }

    /// Books for the current section: the filtered view, or the saved books.
    pub fn visible_books(&self) -> Vec<Book> {
        if self.flags().section == LIBRARY_SECTION {
            let library = lock(&self.inner.library);
            self.inner
                .store
                .books()
                .iter()
                .filter(|b| library.contains(b.id))
                .cloned()
                .collect()
        } else {
            self.inner.store.filtered_books().as_ref().clone()
        }
    }

    fn refresh_grid(&self) {
        let Some(grid) = self.element("booksGrid") else {
            return;
        };
        let books = self.visible_books();
        let library = lock(&self.inner.library);
        let settings = lock(&self.inner.settings);
        render::render_books(&grid, &books, &library, &settings);
    }

    /// Show a toast. It is removed after the toast duration when a tokio
    /// runtime is available.
    pub fn show_toast(&self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("Toast ({}): {}", kind.as_str(), message);
        let duration = {
            let mut toasts = lock(&self.inner.toasts);
            toasts.push(kind, message);
            toasts.duration()
        };
        self.render_toasts();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                let controller = UiController { inner };
                let expired = lock(&controller.inner.toasts).expire(Instant::now());
                if expired > 0 {
                    controller.render_toasts();
                }
            }
        });
    }

    fn render_toasts(&self) {
        if let Some(container) = self.element("toastContainer") {
            render::render_toasts(&container, &lock(&self.inner.toasts));
        }
    }

    /// Inline error panel in the grid, plus an error toast.
    pub fn show_error(&self, message: &str, retryable: bool) {
        if let Some(grid) = self.element("booksGrid") {
            render::render_error_panel(&grid, message, retryable);
        }
        self.show_toast(ToastKind::Error, message);
    }

    /// Replace the page with the fatal error screen.
    pub fn show_fatal(&self, message: &str) {
        tracing::error!("Fatal UI error: {}", message);
        render::render_fatal_screen(&self.body(), message);
    }

    pub fn flags(&self) -> UiFlags {
        lock(&self.inner.flags).clone()
    }

    pub fn toast_count(&self) -> usize {
        lock(&self.inner.toasts).len()
    }

    pub fn saved_books(&self) -> Vec<i64> {
        lock(&self.inner.library).book_ids().to_vec()
    }

    pub fn settings(&self) -> Settings {
        lock(&self.inner.settings).clone()
    }

    /// Replace and persist the settings, then re-render the grid.
    pub fn update_settings(&self, settings: Settings) {
        if let Some(storage) = &self.inner.storage {
            settings.save(storage.as_ref());
        }
        *lock(&self.inner.settings) = settings;
        self.refresh_grid();
    }

    /// Drop bus and store subscriptions and any pending search.
    pub fn destroy(&self) {
        self.inner.debouncer.cancel();
        for subscription in lock(&self.inner.subscriptions).drain(..) {
            subscription.unsubscribe();
        }
        for subscription in lock(&self.inner.state_subscriptions).drain(..) {
            subscription.unsubscribe();
        }
        tracing::debug!("UI controller destroyed");
    }

    fn element(&self, key: &str) -> Option<ElementHandle> {
        match self.inner.elements.get(key) {
            Ok(element) => element,
            Err(e) => {
                tracing::warn!("Element {} unavailable: {}", key, e);
                None
            }
        }
    }

    fn body(&self) -> ElementHandle {
        self.inner.elements.document().body()
    }

    fn modal_fields(&self) -> Option<ModalFields> {
        Some(ModalFields {
            overlay: self.element("modalOverlay")?,
            title: self.element("modalTitle")?,
            cover: self.element("modalCover")?,
            author: self.element("modalAuthor")?,
            category: self.element("modalCategory")?,
            rating: self.element("modalRating")?,
            pages: self.element("modalPages")?,
            description: self.element("modalDescription")?,
        })
    }
}
