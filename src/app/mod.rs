//! Composition root for the catalog client.
//!
//! [`LibraryApp`] builds every component from one [`LibraryConfig`] and wires
//! them together through the event bus. Nothing is global: two apps in one
//! process share no state.
//!
//! Startup order:
//! 1. Element cache (failure here is fatal and replaces the page)
//! 2. Search manager and UI controller subscriptions
//! 3. `core:initialized`, initial catalog load, `app:started`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::BookApiClient;
use crate::config::LibraryConfig;
use crate::dom::ElementCache;
use crate::error::{ErrorContext, LibraryError, LibraryResult};
use crate::event_bus::{AppEvent, EventBus, EventName, Subscription};
use crate::search::SearchManager;
use crate::state::StateStore;
use crate::traits::{Document, HttpClient, KeyValueStore};
use crate::ui::UiController;
use crate::util::lock;

struct AppInner<C: HttpClient + 'static> {
    config: LibraryConfig,
    bus: EventBus,
    store: StateStore,
    elements: ElementCache,
    api: BookApiClient<C>,
    search: SearchManager,
    ui: UiController,
    started: AtomicBool,
    fetch_subscription: Mutex<Option<Subscription>>,
}

/// The catalog client. Clones share the same components.
pub struct LibraryApp<C: HttpClient + 'static> {
    inner: Arc<AppInner<C>>,
}

impl<C: HttpClient + 'static> Clone for LibraryApp<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: HttpClient + 'static> LibraryApp<C> {
    pub fn new(
        config: LibraryConfig,
        client: C,
        storage: Option<Arc<dyn KeyValueStore>>,
        document: Arc<dyn Document>,
    ) -> Self {
        let bus = EventBus::new(config.bus.clone());
        let store = match &storage {
            Some(storage) => {
                StateStore::with_storage(bus.clone(), &config.performance, storage.clone())
            }
            None => StateStore::new(bus.clone(), &config.performance),
        };
        let elements = ElementCache::new(document, bus.clone(), config.dom.clone());
        let api = BookApiClient::new(client, config.api.clone());
        let search = SearchManager::new(bus.clone(), store.clone(), &config, storage.clone());
        let ui = UiController::new(
            bus.clone(),
            store.clone(),
            elements.clone(),
            search.clone(),
            &config.ui,
            storage,
        );

        Self {
            inner: Arc::new(AppInner {
                config,
                bus,
                store,
                elements,
                api,
                search,
                ui,
                started: AtomicBool::new(false),
                fetch_subscription: Mutex::new(None),
            }),
        }
    }

    /// Initialize components and load the catalog.
    ///
    /// Only a component initialization failure is returned as an error; a
    /// failed catalog load is reported on the page with a retry action.
    pub async fn start(&self) -> LibraryResult<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Library app already started");
            return Ok(());
        }

        if let Err(e) = self.inner.elements.init() {
            let err = LibraryError::from(e).with_context(
                ErrorContext::new("start")
                    .with_component("library_app")
                    .with_detail("element cache initialization"),
            );
            tracing::error!("Core initialization failed: {}", err);
            self.inner.ui.show_fatal(&err.user_message());
            self.inner.bus.publish(AppEvent::CoreInitializationFailed {
                message: err.to_string(),
            });
            self.inner.started.store(false, Ordering::SeqCst);
            return Err(err);
        }

        self.inner.search.initialize();
        self.inner.ui.initialize();
        self.subscribe_fetch_requests();
        self.inner.bus.publish(AppEvent::CoreInitialized);
        tracing::info!("Core components initialized");

        // Load failures are already on the page
        let _ = self.load_books().await;

        self.inner.bus.publish(AppEvent::AppStarted);
        Ok(())
    }

    fn subscribe_fetch_requests(&self) {
        let weak = Arc::downgrade(&self.inner);
        let subscription = self.inner.bus.subscribe(EventName::FetchBooksRequested, move |_| {
            let Some(inner) = weak.upgrade() else {
                return Ok(());
            };
            let Ok(handle) = tokio::runtime::Handle::try_current() else {
                tracing::warn!("Book reload requested without a runtime");
                return Ok(());
            };
            let app = LibraryApp { inner };
            handle.spawn(async move {
                let _ = app.load_books().await;
            });
            Ok(())
        });
        *lock(&self.inner.fetch_subscription) = Some(subscription);
    }

    /// Fetch the catalog into state. Failures set the error state and
    /// publish `books:load_failed`.
    pub async fn load_books(&self) -> LibraryResult<usize> {
        self.inner.store.set_loading(true);
        match self.inner.api.get_books().await {
            Ok(books) => {
                let count = books.len();
                self.inner.store.set_books_data(books);
                tracing::info!("Catalog ready with {} books", count);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to load books: {}", e);
                self.inner.store.set_error(true, e.user_message());
                self.inner.bus.publish(AppEvent::BooksLoadFailed {
                    kind: e.error_code().to_string(),
                    message: e.user_message(),
                    retryable: e.is_retryable(),
                });
                Err(e)
            }
        }
    }

    /// Reload the catalog after a failure.
    pub async fn retry(&self) -> LibraryResult<usize> {
        tracing::info!("Retrying catalog load");
        self.load_books().await
    }

    /// Tear everything down. The app cannot be restarted.
    pub fn shutdown(&self) {
        if let Some(subscription) = lock(&self.inner.fetch_subscription).take() {
            subscription.unsubscribe();
        }
        self.inner.ui.destroy();
        self.inner.search.destroy();
        self.inner.elements.destroy();
        self.inner.store.destroy();
        self.inner.bus.clear();
        tracing::info!("Library app shut down");
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.inner.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    pub fn elements(&self) -> &ElementCache {
        &self.inner.elements
    }

    pub fn api(&self) -> &BookApiClient<C> {
        &self.inner.api
    }

    pub fn search(&self) -> &SearchManager {
        &self.inner.search
    }

    pub fn ui(&self) -> &UiController {
        &self.inner.ui
    }
}
