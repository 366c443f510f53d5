//! Wires the search engine to the event bus and the state store.
//!
//! | Event | Effect |
//! |-------|--------|
//! | `books:loaded` | re-index, re-apply the current query, publish category counts |
//! | `search:query:changed` | record history on submit, store the term, search |
//! | `search:query:cleared` | clear the term, show the category view |
//! | `category:selected` | store the category, re-apply the current query |
//! | `state:reset` | drop extra filters, re-index the (now empty) catalog |
//!
//! The manager also installs the store's view filter, so a reloaded catalog
//! is filtered by the engine before any `filteredBooks` listener runs.
//!
//! Every search writes `filteredBooks` and publishes `search:results:ready`
//! followed by `books:filtered`.

use std::sync::{Arc, Mutex, Weak};

use crate::config::LibraryConfig;
use crate::error::{LibraryResult, ValidationError};
use crate::event_bus::{AppEvent, EventBus, EventName, HandlerResult, Subscription};
use crate::models::{Book, Category};
use crate::state::StateStore;
use crate::traits::KeyValueStore;
use crate::util::lock;

use super::engine::{SearchEngine, SearchOutcome};
use super::export::{export_books, ExportFormat};
use super::filters::{RawFilters, SearchFilters};
use super::history::SearchHistory;
use super::similar::similar_books;
use super::stats::{catalog_stats, category_counts, CatalogStats};

struct ManagerInner {
    bus: EventBus,
    store: StateStore,
    engine: Mutex<SearchEngine>,
    history: Mutex<SearchHistory>,
    /// Filters beyond the category, which lives in the state store
    extra_filters: Mutex<SearchFilters>,
    subscriptions: Mutex<Vec<Subscription>>,
    similar_limit: usize,
}

/// Search coordinator. Clones share the same engine and history.
#[derive(Clone)]
pub struct SearchManager {
    inner: Arc<ManagerInner>,
}

impl SearchManager {
    pub fn new(
        bus: EventBus,
        store: StateStore,
        config: &LibraryConfig,
        storage: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        let history_size = config.performance.search_history_size;
        let history = match storage {
            Some(storage) => SearchHistory::load(storage, history_size),
            None => SearchHistory::new(history_size),
        };

        Self {
            inner: Arc::new(ManagerInner {
                bus,
                store,
                engine: Mutex::new(SearchEngine::from_config(&config.performance, &config.ui)),
                history: Mutex::new(history),
                extra_filters: Mutex::new(SearchFilters::default()),
                subscriptions: Mutex::new(Vec::new()),
                similar_limit: config.performance.similar_books_limit,
            }),
        }
    }

    /// Subscribe to the bus. Calling it twice is a no-op.
    pub fn initialize(&self) {
        let mut subscriptions = lock(&self.inner.subscriptions);
        if !subscriptions.is_empty() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        subscriptions.push(self.inner.bus.subscribe(
            EventName::BooksLoaded,
            with_manager(&weak, |manager, _| {
                manager.reindex();
                Ok(())
            }),
        ));
        subscriptions.push(self.inner.bus.subscribe(
            EventName::SearchQueryChanged,
            with_manager(&weak, |manager, event| {
                if let AppEvent::SearchQueryChanged { query, submit } = event {
                    if *submit {
                        lock(&manager.inner.history).add(query);
                    }
                    manager.inner.store.set_search_term(query);
                    manager.apply();
                }
                Ok(())
            }),
        ));
        subscriptions.push(self.inner.bus.subscribe(
            EventName::SearchQueryCleared,
            with_manager(&weak, |manager, _| {
                manager.inner.store.set_search_term("");
                manager.apply();
                Ok(())
            }),
        ));
        subscriptions.push(self.inner.bus.subscribe(
            EventName::CategorySelected,
            with_manager(&weak, |manager, event| {
                if let AppEvent::CategorySelected { category } = event {
                    manager.inner.store.set_current_category(*category);
                    manager.apply();
                }
                Ok(())
            }),
        ));

        subscriptions.push(self.inner.bus.subscribe(
            EventName::StateReset,
            with_manager(&weak, |manager, _| {
                *lock(&manager.inner.extra_filters) = SearchFilters::default();
                manager.reindex();
                Ok(())
            }),
        ));

        let view = weak.clone();
        self.inner.store.set_view_filter(move |books, state| match view.upgrade() {
            Some(inner) => {
                let mut filters = lock(&inner.extra_filters).clone();
                filters.category = state.current_category;
                let mut engine = lock(&inner.engine);
                engine.set_books(books);
                engine.search(&state.search_term, &filters).results
            }
            None => books,
        });

        tracing::debug!("Search manager subscribed to {} events", subscriptions.len());
    }

    /// Run `query` under the current filters without touching state.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let filters = self.current_filters();
        lock(&self.inner.engine).search(query, &filters)
    }

    /// Validate and apply loosely typed filters. A category in `raw`
    /// replaces the current one. Validation failures publish `search:failed`.
    pub fn set_filters(&self, raw: &RawFilters) -> LibraryResult<()> {
        let filters = match SearchFilters::from_raw(raw) {
            Ok(filters) => filters,
            Err(e) => {
                self.report_failure(&e);
                return Err(e.into());
            }
        };

        if raw.category.is_some() {
            self.inner.store.set_current_category(filters.category);
        }
        *lock(&self.inner.extra_filters) = filters;
        self.apply();
        Ok(())
    }

    /// Select a category by raw name.
    pub fn select_category(&self, value: &str) -> LibraryResult<Category> {
        match Category::parse(value) {
            Ok(category) => {
                self.inner.bus.publish(AppEvent::CategorySelected { category });
                Ok(category)
            }
            Err(e) => {
                self.report_failure(&e);
                Err(e.into())
            }
        }
    }

    /// Re-run the stored query and write the results to state.
    pub fn apply(&self) -> SearchOutcome {
        let query = self.inner.store.search_term();
        let filters = self.current_filters();
        let outcome = lock(&self.inner.engine).search(&query, &filters);

        let total = self.inner.store.books().len();
        self.inner.store.set_filtered_books(outcome.results.clone());
        self.inner.bus.publish(AppEvent::SearchResultsReady {
            query: outcome.query.clone(),
            category: filters.category,
            results: outcome.results.clone(),
            from_cache: outcome.from_cache,
        });
        self.inner.bus.publish(AppEvent::BooksFiltered {
            count: outcome.results.len(),
            total,
        });
        outcome
    }

    fn reindex(&self) {
        let books = self.inner.store.books();
        let counts = category_counts(&books);
        lock(&self.inner.engine).set_books(books);
        self.apply();
        self.inner
            .bus
            .publish(AppEvent::CategoriesStatsUpdated { counts });
    }

    fn current_filters(&self) -> SearchFilters {
        let mut filters = lock(&self.inner.extra_filters).clone();
        filters.category = self.inner.store.current_category();
        filters
    }

    fn report_failure(&self, error: &ValidationError) {
        tracing::warn!("Search rejected: {}", error);
        self.inner.bus.publish(AppEvent::SearchFailed {
            query: self.inner.store.search_term(),
            message: error.user_message(),
        });
    }

    /// Submitted queries, newest first.
    pub fn history(&self) -> Vec<String> {
        lock(&self.inner.history).entries()
    }

    pub fn clear_history(&self) {
        lock(&self.inner.history).clear();
    }

    pub fn stats(&self) -> CatalogStats {
        let books = self.inner.store.books();
        catalog_stats(&books, self.inner.store.filtered_books().len())
    }

    pub fn similar_books(&self, book_id: i64) -> Vec<Book> {
        similar_books(&self.inner.store.books(), book_id, self.inner.similar_limit)
    }

    /// Export the current filtered view.
    pub fn export(&self, format: ExportFormat) -> LibraryResult<String> {
        export_books(&self.inner.store.filtered_books(), format)
    }

    /// (hits, misses)
    pub fn cache_stats(&self) -> (u64, u64) {
        lock(&self.inner.engine).cache_stats()
    }

    pub fn clear_cache(&self) {
        lock(&self.inner.engine).clear_cache();
    }

    /// Drop bus subscriptions and the store's view filter.
    pub fn destroy(&self) {
        for subscription in lock(&self.inner.subscriptions).drain(..) {
            subscription.unsubscribe();
        }
        self.inner.store.clear_view_filter();
    }
}

fn with_manager<F>(
    weak: &Weak<ManagerInner>,
    f: F,
) -> impl Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static
where
    F: Fn(&SearchManager, &AppEvent) -> HandlerResult + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |event| match weak.upgrade() {
        Some(inner) => f(&SearchManager { inner }, event),
        None => Ok(()),
    }
}
