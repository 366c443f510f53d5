//! The single mutable application state.
//!
//! All mutation goes through [`StateStore::set`] and friends. Listeners are
//! registered per key and only hear about the keys that changed; after the
//! key listeners run, the store publishes `state:changed` on the bus.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::{storage_keys, PerformanceConfig};
use crate::event_bus::{AppEvent, EventBus, HandlerResult};
use crate::models::{Book, Category, Theme};
use crate::search::{normalize, tokenize};
use crate::traits::KeyValueStore;
use crate::util::lock;

use super::app_state::{AppState, StateKey, StateUpdate};

type StateHandler = Arc<dyn Fn(StateKey, &AppState) -> HandlerResult + Send + Sync>;

/// Computes `filteredBooks` for a freshly loaded catalog under the current state.
pub type ViewFilter = Arc<dyn Fn(Arc<Vec<Book>>, &AppState) -> Arc<Vec<Book>> + Send + Sync>;

struct StateListener {
    id: u64,
    keys: Vec<StateKey>,
    handler: StateHandler,
}

/// One recorded mutation.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub changed_keys: Vec<StateKey>,
    /// State as it was before the mutation.
    pub previous: AppState,
}

/// Summary returned by [`StateStore::stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StateStats {
    pub total_books: usize,
    pub filtered_books: usize,
    pub search_term: String,
    pub current_category: Category,
    pub is_loading: bool,
    pub has_error: bool,
    pub theme: Theme,
    pub listeners_count: usize,
    pub history_size: usize,
    pub last_update: Option<DateTime<Utc>>,
}

struct StoreInner {
    state: Mutex<AppState>,
    listeners: Mutex<Vec<StateListener>>,
    history: Mutex<VecDeque<HistoryEntry>>,
    history_limit: usize,
    next_id: AtomicU64,
    bus: EventBus,
    storage: Option<Arc<dyn KeyValueStore>>,
    view_filter: Mutex<Option<ViewFilter>>,
}

impl StoreInner {
    fn remove_listener(&self, id: u64) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }
}

/// Handle returned by [`StateStore::subscribe`].
#[derive(Clone)]
pub struct StateSubscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl StateSubscription {
    pub fn unsubscribe(&self) -> bool {
        match self.store.upgrade() {
            Some(store) => store.remove_listener(self.id),
            None => false,
        }
    }
}

/// Shared application state. Clones refer to the same store.
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<StoreInner>,
}

impl StateStore {
    pub fn new(bus: EventBus, config: &PerformanceConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(AppState::default()),
                listeners: Mutex::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
                history_limit: config.state_history_size,
                next_id: AtomicU64::new(1),
                bus,
                storage: None,
                view_filter: Mutex::new(None),
            }),
        }
    }

    /// Create a store that persists the theme and starts from the saved one.
    pub fn with_storage(
        bus: EventBus,
        config: &PerformanceConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let mut initial = AppState::default();
        match storage.get(storage_keys::THEME) {
            Ok(Some(saved)) => match Theme::parse(&saved) {
                Ok(theme) => initial.theme = theme,
                Err(e) => tracing::warn!("Ignoring saved theme: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read saved theme: {}", e),
        }

        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
                history_limit: config.state_history_size,
                next_id: AtomicU64::new(1),
                bus,
                storage: Some(storage),
                view_filter: Mutex::new(None),
            }),
        }
    }

    /// A copy of the whole state.
    pub fn snapshot(&self) -> AppState {
        lock(&self.inner.state).clone()
    }

    /// Read a value by dotted path, e.g. `"selectedBook.title"` or
    /// `"books.0.author"`. Returns `None` when any segment is missing.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let root = serde_json::to_value(&*lock(&self.inner.state)).ok()?;
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(root, |value, segment| match value {
                Value::Object(mut map) => map.remove(segment),
                Value::Array(mut items) => {
                    let index: usize = segment.parse().ok()?;
                    if index < items.len() {
                        Some(items.swap_remove(index))
                    } else {
                        None
                    }
                }
                _ => None,
            })
    }

    /// Apply one update and notify.
    pub fn set(&self, update: StateUpdate) {
        self.apply(vec![update], false);
    }

    /// Apply several updates as one change and notify once per key.
    pub fn set_many(&self, updates: impl IntoIterator<Item = StateUpdate>) {
        self.apply(updates.into_iter().collect(), false);
    }

    /// Apply updates without history or notifications.
    pub fn set_silent(&self, updates: impl IntoIterator<Item = StateUpdate>) {
        self.apply(updates.into_iter().collect(), true);
    }

    fn apply(&self, updates: Vec<StateUpdate>, silent: bool) {
        if updates.is_empty() {
            return;
        }

        let mut changed_keys: Vec<StateKey> = Vec::with_capacity(updates.len());
        let (previous, current) = {
            let mut state = lock(&self.inner.state);
            let previous = state.clone();
            for update in updates {
                let key = update.key();
                if !changed_keys.contains(&key) {
                    changed_keys.push(key);
                }
                update.apply(&mut state);
            }
            state.last_update = Some(Utc::now());
            (previous, state.clone())
        };

        if silent {
            return;
        }

        {
            let mut history = lock(&self.inner.history);
            history.push_back(HistoryEntry {
                timestamp: Utc::now(),
                changed_keys: changed_keys.clone(),
                previous,
            });
            while history.len() > self.inner.history_limit {
                history.pop_front();
            }
        }

        self.notify(&changed_keys, &current);
        self.inner.bus.publish(AppEvent::StateChanged { changed_keys });
    }

    fn notify(&self, changed_keys: &[StateKey], state: &AppState) {
        for key in changed_keys {
            let handlers: Vec<(u64, StateHandler)> = lock(&self.inner.listeners)
                .iter()
                .filter(|l| l.keys.contains(key))
                .map(|l| (l.id, l.handler.clone()))
                .collect();

            for (id, handler) in handlers {
                match catch_unwind(AssertUnwindSafe(|| handler(*key, state))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!("State listener {} failed on {}: {}", id, key, e)
                    }
                    Err(_) => tracing::error!("State listener {} panicked on {}", id, key),
                }
            }
        }
    }

    /// Listen for changes to any of `keys`. The handler gets the changed key
    /// and the state after the change.
    pub fn subscribe<F>(&self, keys: &[StateKey], handler: F) -> StateSubscription
    where
        F: Fn(StateKey, &AppState) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push(StateListener {
            id,
            keys: keys.to_vec(),
            handler: Arc::new(handler),
        });
        StateSubscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Restore defaults, optionally keeping the theme, and clear history.
    pub fn reset(&self, keep_user_settings: bool) {
        {
            let mut state = lock(&self.inner.state);
            let theme = state.theme;
            *state = AppState::default();
            if keep_user_settings {
                state.theme = theme;
            }
            state.last_update = Some(Utc::now());
        }
        lock(&self.inner.history).clear();

        self.inner.bus.publish(AppEvent::StateReset { keep_user_settings });
        tracing::info!("State reset (keep user settings: {})", keep_user_settings);
    }

    /// The most recent `limit` history entries, oldest first.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let history = lock(&self.inner.history);
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn stats(&self) -> StateStats {
        let state = lock(&self.inner.state);
        StateStats {
            total_books: state.books.len(),
            filtered_books: state.filtered_books.len(),
            search_term: state.search_term.clone(),
            current_category: state.current_category,
            is_loading: state.is_loading,
            has_error: state.has_error,
            theme: state.theme,
            listeners_count: lock(&self.inner.listeners).len(),
            history_size: lock(&self.inner.history).len(),
            last_update: state.last_update,
        }
    }

    /// Drop derived results and the selection.
    pub fn clear_cache(&self) {
        self.set_many([
            StateUpdate::SearchResults(Arc::new(Vec::new())),
            StateUpdate::SelectedBook(None),
        ]);
    }

    /// Remove all listeners, clear history and restore defaults without
    /// notifying anyone.
    pub fn destroy(&self) {
        lock(&self.inner.listeners).clear();
        lock(&self.inner.history).clear();
        *lock(&self.inner.state) = AppState::default();
        tracing::debug!("State store destroyed");
    }

    // Typed accessors

    pub fn books(&self) -> Arc<Vec<Book>> {
        lock(&self.inner.state).books.clone()
    }

    pub fn filtered_books(&self) -> Arc<Vec<Book>> {
        lock(&self.inner.state).filtered_books.clone()
    }

    pub fn selected_book(&self) -> Option<Book> {
        lock(&self.inner.state).selected_book.clone()
    }

    pub fn current_category(&self) -> Category {
        lock(&self.inner.state).current_category
    }

    pub fn search_term(&self) -> String {
        lock(&self.inner.state).search_term.clone()
    }

    pub fn theme(&self) -> Theme {
        lock(&self.inner.state).theme
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.state).is_loading
    }

    pub fn has_error(&self) -> bool {
        lock(&self.inner.state).has_error
    }

    pub fn is_sidebar_open(&self) -> bool {
        lock(&self.inner.state).sidebar_open
    }

    pub fn is_modal_open(&self) -> bool {
        lock(&self.inner.state).modal_open
    }

    pub fn find_book(&self, id: i64) -> Option<Book> {
        lock(&self.inner.state)
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    // Typed setters

    /// Install the filter used to build the view of a reloaded catalog.
    pub fn set_view_filter<F>(&self, filter: F)
    where
        F: Fn(Arc<Vec<Book>>, &AppState) -> Arc<Vec<Book>> + Send + Sync + 'static,
    {
        *lock(&self.inner.view_filter) = Some(Arc::new(filter));
    }

    pub fn clear_view_filter(&self) {
        *lock(&self.inner.view_filter) = None;
    }

    /// Replace the catalog. The filtered view already honours the current
    /// category and search term when listeners are notified.
    pub fn set_books_data(&self, books: Vec<Book>) {
        let books = Arc::new(books);
        let count = books.len();
        let filtered = self.filtered_view(books.clone());
        self.set_many([
            StateUpdate::Books(books),
            StateUpdate::FilteredBooks(filtered),
            StateUpdate::IsLoading(false),
            StateUpdate::HasError(false),
            StateUpdate::ErrorMessage(String::new()),
        ]);
        self.inner.bus.publish(AppEvent::BooksLoaded { count });
    }

    fn filtered_view(&self, books: Arc<Vec<Book>>) -> Arc<Vec<Book>> {
        let filter = lock(&self.inner.view_filter).clone();
        let state = self.snapshot();
        match filter {
            Some(filter) => filter(books, &state),
            None => {
                let tokens = tokenize(&state.search_term);
                let view: Vec<Book> = books
                    .iter()
                    .filter(|b| state.current_category.matches(b))
                    .filter(|b| {
                        let text = normalize(&b.searchable_text());
                        tokens.iter().all(|t| text.contains(t.as_str()))
                    })
                    .cloned()
                    .collect();
                Arc::new(view)
            }
        }
    }

    pub fn set_filtered_books(&self, books: Arc<Vec<Book>>) {
        self.set(StateUpdate::FilteredBooks(books));
    }

    pub fn set_selected_book(&self, book: Option<Book>) {
        self.set(StateUpdate::SelectedBook(book));
    }

    pub fn set_search_term(&self, term: &str) {
        self.set(StateUpdate::SearchTerm(term.trim().to_string()));
    }

    pub fn set_current_category(&self, category: Category) {
        self.set(StateUpdate::CurrentCategory(category));
    }

    pub fn set_loading(&self, loading: bool) {
        self.set(StateUpdate::IsLoading(loading));
    }

    pub fn set_error(&self, has_error: bool, message: impl Into<String>) {
        let message = if has_error { message.into() } else { String::new() };
        self.set_many([
            StateUpdate::HasError(has_error),
            StateUpdate::ErrorMessage(message),
            StateUpdate::IsLoading(false),
        ]);
    }

    /// Set and persist the theme. A storage failure is logged and ignored.
    pub fn set_theme(&self, theme: Theme) {
        self.set(StateUpdate::Theme(theme));
        if let Some(storage) = &self.inner.storage {
            if let Err(e) = storage.set(storage_keys::THEME, theme.as_str()) {
                tracing::warn!("Could not persist theme: {}", e);
            }
        }
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.set(StateUpdate::SidebarOpen(open));
    }

    pub fn set_modal_open(&self, open: bool) {
        self.set(StateUpdate::ModalOpen(open));
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("history_limit", &self.inner.history_limit)
            .finish_non_exhaustive()
    }
}
