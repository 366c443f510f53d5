//! Memoized lookups of the named page elements.
//!
//! At [`ElementCache::init`] every configured selector is resolved once.
//! Selectors that match nothing get a hidden placeholder so callers never
//! deal with a missing element, and a background retry keeps looking for
//! the real one. When the document reports mutations, added elements
//! replace placeholders and removed elements are swapped back out.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::DomConfig;
use crate::error::DomError;
use crate::event_bus::{AppEvent, EventBus};
use crate::traits::Document;
use crate::util::lock;

use super::document::Mutation;
use super::element::ElementHandle;
use super::resolver::{ElementResolver, ObserverResolver, PollingResolver, Resolution};
use super::selector::Selector;

type ReadyCallback = Box<dyn FnOnce() + Send>;

struct CachedElement {
    element: ElementHandle,
    selector: String,
    is_placeholder: bool,
}

impl CachedElement {
    fn found(element: ElementHandle, selector: &str) -> Self {
        Self {
            element,
            selector: selector.to_string(),
            is_placeholder: false,
        }
    }

    fn placeholder(key: &str, selector: &str) -> Self {
        Self {
            element: ElementHandle::placeholder(key, selector),
            selector: selector.to_string(),
            is_placeholder: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    elements_found: u64,
    elements_not_found: u64,
    cache_hits: u64,
    cache_misses: u64,
    retry_attempts: u64,
}

#[derive(Default)]
struct CacheState {
    ready: bool,
    destroyed: bool,
    observer_active: bool,
    entries: HashMap<String, CachedElement>,
    ready_callbacks: Vec<ReadyCallback>,
    counters: Counters,
}

/// Counters and flags reported by [`ElementCache::stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomStats {
    pub elements_found: u64,
    pub elements_not_found: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub retry_attempts: u64,
    pub is_ready: bool,
    pub total_cached: usize,
    pub placeholder_count: usize,
    pub observer_active: bool,
    pub ready_callbacks_pending: usize,
}

struct CacheInner {
    document: Arc<dyn Document>,
    bus: EventBus,
    config: DomConfig,
    resolver: Arc<dyn ElementResolver>,
    state: Mutex<CacheState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheInner {
    fn spawn<F>(&self, future: F) -> bool
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let mut tasks = lock(&self.tasks);
                tasks.retain(|t| !t.is_finished());
                tasks.push(handle.spawn(future));
                true
            }
            Err(_) => false,
        }
    }

    /// Resolve every configured selector. Returns (found, placeholders).
    fn cache_essential(self: &Arc<Self>) -> (usize, usize) {
        let mut missing = Vec::new();
        let mut found = 0;
        {
            let mut state = lock(&self.state);
            for (key, selector) in &self.config.selectors {
                match self.document.query(selector) {
                    Some(element) => {
                        tracing::debug!("Found {} ({})", key, selector);
                        state
                            .entries
                            .insert(key.clone(), CachedElement::found(element, selector));
                        found += 1;
                    }
                    None => {
                        tracing::warn!("Element {} ({}) not found, using placeholder", key, selector);
                        state
                            .entries
                            .insert(key.clone(), CachedElement::placeholder(key, selector));
                        missing.push((key.clone(), selector.clone()));
                    }
                }
            }
            state.counters.elements_found += found as u64;
            state.counters.elements_not_found += missing.len() as u64;
        }

        let placeholders = missing.len();
        for (key, selector) in missing {
            self.schedule_retry(key, selector);
        }
        tracing::debug!("Cached {} elements, {} placeholders", found, placeholders);
        (found, placeholders)
    }

    fn schedule_retry(self: &Arc<Self>, key: String, selector: String) {
        if self.config.retry_attempts == 0 {
            return;
        }
        let weak: Weak<CacheInner> = Arc::downgrade(self);
        let document = self.document.clone();
        let resolver = self.resolver.clone();
        let task_key = key.clone();
        let spawned = self.spawn(async move {
            let resolution = resolver.resolve(document.as_ref(), &selector).await;
            if let Some(inner) = weak.upgrade() {
                inner.finish_retry(&task_key, &selector, resolution);
            }
        });
        if !spawned {
            tracing::debug!("No async runtime, not retrying {}", key);
        }
    }

    fn finish_retry(&self, key: &str, selector: &str, resolution: Resolution) {
        let replaced = {
            let mut state = lock(&self.state);
            if state.destroyed {
                return;
            }
            state.counters.retry_attempts += u64::from(resolution.failed_attempts);

            let Some(element) = resolution.element else {
                tracing::warn!(
                    "Giving up on {} ({}) after {} attempts",
                    key,
                    selector,
                    resolution.failed_attempts
                );
                return;
            };

            match state.entries.get(key) {
                Some(entry) if entry.is_placeholder && entry.selector == selector => {
                    state
                        .entries
                        .insert(key.to_string(), CachedElement::found(element, selector));
                    state.counters.elements_found += 1;
                    state.counters.elements_not_found =
                        state.counters.elements_not_found.saturating_sub(1);
                    true
                }
                _ => false,
            }
        };

        if replaced {
            tracing::debug!("Found {} on retry", key);
            self.bus.publish(AppEvent::DomElementFound {
                key: key.to_string(),
            });
        }
    }

    fn start_observer(self: &Arc<Self>) {
        let Some(mut rx) = self.document.mutations() else {
            tracing::debug!("Document does not report mutations");
            return;
        };
        let weak = Arc::downgrade(self);
        let spawned = self.spawn(async move {
            loop {
                let mutation = rx.recv().await;
                let Some(inner) = weak.upgrade() else { break };
                match mutation {
                    Ok(Mutation::Added(node)) => inner.handle_added(&node),
                    Ok(Mutation::Removed(_)) => inner.handle_removed(),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Mutation observer lagged by {}", skipped);
                        inner.handle_removed();
                        inner.handle_added(&inner.document.body());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        lock(&self.state).observer_active = spawned;
    }

    /// Swap placeholders for `node` or a matching descendant of it.
    fn handle_added(&self, node: &ElementHandle) {
        let mut replaced = Vec::new();
        {
            let mut state = lock(&self.state);
            if state.destroyed {
                return;
            }
            for (key, entry) in state.entries.iter_mut() {
                if !entry.is_placeholder {
                    continue;
                }
                let Ok(selector) = Selector::parse(&entry.selector) else {
                    continue;
                };
                let candidate = if node.matches(&selector) {
                    Some(node.clone())
                } else {
                    node.find(&selector)
                };
                if let Some(element) = candidate {
                    *entry = CachedElement::found(element, &entry.selector);
                    replaced.push(key.clone());
                }
            }
            state.counters.elements_found += replaced.len() as u64;
            state.counters.elements_not_found = state
                .counters
                .elements_not_found
                .saturating_sub(replaced.len() as u64);
        }

        for key in replaced {
            tracing::debug!("Replaced placeholder for {}", key);
            self.bus.publish(AppEvent::DomElementReplaced { key });
        }
    }

    /// Swap detached elements for placeholders and start looking again.
    fn handle_removed(self: &Arc<Self>) {
        let mut removed = Vec::new();
        {
            let mut state = lock(&self.state);
            if state.destroyed {
                return;
            }
            for (key, entry) in state.entries.iter_mut() {
                if entry.is_placeholder || self.document.contains(&entry.element) {
                    continue;
                }
                *entry = CachedElement::placeholder(key, &entry.selector);
                removed.push((key.clone(), entry.selector.clone()));
            }
        }

        for (key, selector) in removed {
            tracing::warn!("Element {} was removed from the document", key);
            self.bus.publish(AppEvent::DomElementRemoved { key: key.clone() });
            self.schedule_retry(key, selector);
        }
    }
}

/// Cache of named page elements. Clones share the same cache.
#[derive(Clone)]
pub struct ElementCache {
    inner: Arc<CacheInner>,
}

impl ElementCache {
    /// Create a cache whose retry strategy follows `config.observe_mutations`.
    pub fn new(document: Arc<dyn Document>, bus: EventBus, config: DomConfig) -> Self {
        let resolver: Arc<dyn ElementResolver> = if config.observe_mutations {
            Arc::new(ObserverResolver::from_config(&config))
        } else {
            Arc::new(PollingResolver::from_config(&config))
        };
        Self::with_resolver(document, bus, config, resolver)
    }

    pub fn with_resolver(
        document: Arc<dyn Document>,
        bus: EventBus,
        config: DomConfig,
        resolver: Arc<dyn ElementResolver>,
    ) -> Self {
        tracing::debug!("Element cache using {} resolver", resolver.name());
        Self {
            inner: Arc::new(CacheInner {
                document,
                bus,
                config,
                resolver,
                state: Mutex::new(CacheState::default()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn document(&self) -> Arc<dyn Document> {
        self.inner.document.clone()
    }

    /// Resolve the configured selectors, start observing and run pending
    /// ready callbacks. Calling it twice is a no-op.
    pub fn init(&self) -> Result<(), DomError> {
        {
            let state = lock(&self.inner.state);
            if state.destroyed {
                return Err(DomError::Destroyed);
            }
            if state.ready {
                tracing::warn!("Element cache already initialized");
                return Ok(());
            }
        }
        if !self.inner.document.is_ready() {
            return Err(DomError::NotReady {
                key: "document".to_string(),
            });
        }

        lock(&self.inner.state).ready = true;
        let (found, placeholders) = self.inner.cache_essential();
        if self.inner.config.observe_mutations {
            self.inner.start_observer();
        }

        let callbacks = std::mem::take(&mut lock(&self.inner.state).ready_callbacks);
        for callback in callbacks {
            run_callback(callback);
        }

        tracing::info!(
            "Element cache ready: {} found, {} placeholders",
            found,
            placeholders
        );
        self.inner
            .bus
            .publish(AppEvent::DomReady { found, placeholders });
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        lock(&self.inner.state).ready
    }

    /// Run `callback` once the cache is ready, or now if it already is.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let callback: ReadyCallback = Box::new(callback);
        let pending = {
            let mut state = lock(&self.inner.state);
            if state.ready {
                Some(callback)
            } else {
                state.ready_callbacks.push(callback);
                None
            }
        };
        if let Some(callback) = pending {
            run_callback(callback);
        }
    }

    /// Element for `key`: the real element, or its placeholder while the
    /// real one is missing. `Ok(None)` for keys that were never registered.
    ///
    /// Fails if called before [`ElementCache::init`] or after
    /// [`ElementCache::destroy`].
    pub fn get(&self, key: &str) -> Result<Option<ElementHandle>, DomError> {
        {
            let mut state = lock(&self.inner.state);
            if state.destroyed {
                return Err(DomError::Destroyed);
            }
            if !state.ready {
                return Err(DomError::NotReady {
                    key: key.to_string(),
                });
            }

            let document = &self.inner.document;
            let CacheState {
                entries, counters, ..
            } = &mut *state;
            match entries.get_mut(key) {
                None => {
                    counters.cache_misses += 1;
                    tracing::debug!("Unknown element key {}", key);
                    return Ok(None);
                }
                Some(entry) => {
                    counters.cache_hits += 1;
                    if entry.is_placeholder || document.contains(&entry.element) {
                        return Ok(Some(entry.element.clone()));
                    }
                }
            }
        }

        tracing::debug!("Element {} left the document, refreshing", key);
        self.refresh_element(key);
        Ok(lock(&self.inner.state)
            .entries
            .get(key)
            .map(|e| e.element.clone()))
    }

    /// Re-query `key`'s selector. Returns true if a real element was found;
    /// otherwise the entry becomes a placeholder.
    pub fn refresh_element(&self, key: &str) -> bool {
        let mut state = lock(&self.inner.state);
        let Some(entry) = state.entries.get_mut(key) else {
            return false;
        };
        match self.inner.document.query(&entry.selector) {
            Some(element) => {
                entry.element = element;
                entry.is_placeholder = false;
                tracing::debug!("Refreshed {}", key);
                true
            }
            None => {
                entry.element = ElementHandle::placeholder(key, &entry.selector);
                entry.is_placeholder = true;
                false
            }
        }
    }

    /// Whether `key` currently resolves to a real, attached element.
    pub fn exists(&self, key: &str) -> bool {
        lock(&self.inner.state)
            .entries
            .get(key)
            .map(|e| !e.is_placeholder && self.inner.document.contains(&e.element))
            .unwrap_or(false)
    }

    /// Track an extra element. Returns it if the selector matches now;
    /// nothing is cached otherwise.
    pub fn add_element(&self, key: &str, selector: &str) -> Result<Option<ElementHandle>, DomError> {
        Selector::parse(selector)?;
        let mut state = lock(&self.inner.state);
        if state.destroyed {
            return Err(DomError::Destroyed);
        }
        let Some(element) = self.inner.document.query(selector) else {
            return Ok(None);
        };
        state
            .entries
            .insert(key.to_string(), CachedElement::found(element.clone(), selector));
        tracing::debug!("Added element {} ({})", key, selector);
        Ok(Some(element))
    }

    /// Stop tracking `key`.
    pub fn remove_element(&self, key: &str) -> bool {
        let removed = lock(&self.inner.state).entries.remove(key).is_some();
        if removed {
            tracing::debug!("Removed element {} from cache", key);
        }
        removed
    }

    /// Uncached query.
    pub fn query(&self, selector: &str) -> Option<ElementHandle> {
        self.inner.document.query(selector)
    }

    /// Uncached query for every match.
    pub fn query_all(&self, selector: &str) -> Vec<ElementHandle> {
        self.inner.document.query_all(selector)
    }

    pub fn stats(&self) -> DomStats {
        let state = lock(&self.inner.state);
        DomStats {
            elements_found: state.counters.elements_found,
            elements_not_found: state.counters.elements_not_found,
            cache_hits: state.counters.cache_hits,
            cache_misses: state.counters.cache_misses,
            retry_attempts: state.counters.retry_attempts,
            is_ready: state.ready,
            total_cached: state.entries.len(),
            placeholder_count: state.entries.values().filter(|e| e.is_placeholder).count(),
            observer_active: state.observer_active,
            ready_callbacks_pending: state.ready_callbacks.len(),
        }
    }

    /// Drop every entry and, if ready, resolve the configured set again.
    pub fn clear_cache(&self) {
        let (count, ready) = {
            let mut state = lock(&self.inner.state);
            let count = state.entries.len();
            state.entries.clear();
            (count, state.ready)
        };
        if ready {
            self.inner.cache_essential();
        }
        tracing::debug!("Cleared {} cached elements", count);
    }

    /// Stop background work and forget everything. Later lookups fail.
    pub fn destroy(&self) {
        for task in lock(&self.inner.tasks).drain(..) {
            task.abort();
        }
        let mut state = lock(&self.inner.state);
        state.entries.clear();
        state.ready_callbacks.clear();
        state.ready = false;
        state.observer_active = false;
        state.destroyed = true;
        tracing::debug!("Element cache destroyed");
    }
}

impl std::fmt::Debug for ElementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCache")
            .field("resolver", &self.inner.resolver.name())
            .finish_non_exhaustive()
    }
}

fn run_callback(callback: ReadyCallback) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        tracing::error!("Element cache ready callback panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::event_bus::EventName;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config(keys: &[&str]) -> DomConfig {
        DomConfig {
            selectors: keys
                .iter()
                .map(|k| (k.to_string(), format!("#{}", k)))
                .collect(),
            retry_interval: Duration::from_millis(5),
            retry_attempts: 3,
            observe_mutations: false,
        }
    }

    fn page(ids: &[&str]) -> Arc<MemoryDocument> {
        let document = MemoryDocument::new();
        for id in ids {
            document.body().append_child(ElementHandle::new("div").with_id(id));
        }
        Arc::new(document)
    }

    #[test]
    fn test_get_before_init_fails() {
        let cache = ElementCache::new(page(&[]), EventBus::default(), config(&["booksGrid"]));
        let err = cache.get("booksGrid").unwrap_err();
        assert!(matches!(err, DomError::NotReady { .. }));
    }

    #[test]
    fn test_missing_element_gets_placeholder() {
        let bus = EventBus::default();
        let ready = Arc::new(Mutex::new(None));
        let r = ready.clone();
        bus.subscribe(EventName::DomReady, move |event| {
            if let AppEvent::DomReady { found, placeholders } = event {
                *r.lock().unwrap() = Some((*found, *placeholders));
            }
            Ok(())
        });

        let cache = ElementCache::new(
            page(&["booksGrid"]),
            bus,
            config(&["booksGrid", "searchInput"]),
        );
        cache.init().unwrap();

        assert_eq!(*ready.lock().unwrap(), Some((1, 1)));
        let input = cache.get("searchInput").unwrap().unwrap();
        assert!(input.is_placeholder());
        assert!(!cache.exists("searchInput"));
        assert!(cache.exists("booksGrid"));
        assert!(cache.get("unknown").unwrap().is_none());

        let stats = cache.stats();
        assert_eq!(stats.placeholder_count, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[test]
    fn test_ready_callbacks() {
        let cache = ElementCache::new(page(&[]), EventBus::default(), config(&[]));
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        cache.on_ready(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(cache.stats().ready_callbacks_pending, 1);
        cache.on_ready(|| panic!("bad callback"));

        cache.init().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let c = calls.clone();
        cache.on_ready(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detached_element_is_refreshed_on_get() {
        let document = page(&["booksGrid"]);
        let cache = ElementCache::new(document.clone(), EventBus::default(), config(&["booksGrid"]));
        cache.init().unwrap();

        let old = cache.get("booksGrid").unwrap().unwrap();
        document.body().remove_child(&old);
        let replacement = ElementHandle::new("div").with_id("booksGrid");
        document.body().append_child(replacement.clone());

        assert_eq!(cache.get("booksGrid").unwrap().unwrap(), replacement);
    }

    #[test]
    fn test_add_and_remove_element() {
        let cache = ElementCache::new(page(&["extra"]), EventBus::default(), config(&[]));
        assert!(cache.add_element("extra", "#extra").unwrap().is_some());
        assert!(cache.add_element("nothing", "#nothing").unwrap().is_none());
        assert!(matches!(
            cache.add_element("bad", "#").unwrap_err(),
            DomError::InvalidSelector { .. }
        ));
        assert!(cache.remove_element("extra"));
        assert!(!cache.remove_element("extra"));
    }

    #[test]
    fn test_destroy() {
        let cache = ElementCache::new(page(&["booksGrid"]), EventBus::default(), config(&["booksGrid"]));
        cache.init().unwrap();
        cache.destroy();
        assert!(matches!(cache.get("booksGrid"), Err(DomError::Destroyed)));
        assert!(matches!(cache.init(), Err(DomError::Destroyed)));
    }

    #[test]
    fn test_loading_document_is_not_ready() {
        let document = Arc::new(MemoryDocument::new().loading());
        let cache = ElementCache::new(document.clone(), EventBus::default(), config(&[]));
        assert!(cache.init().is_err());
        document.mark_ready();
        assert!(cache.init().is_ok());
    }

    #[tokio::test]
    async fn test_retry_finds_late_element() {
        let bus = EventBus::default();
        let document = page(&[]);
        let cache = ElementCache::new(document.clone(), bus.clone(), config(&["sidebar"]));
        cache.init().unwrap();
        assert!(cache.get("sidebar").unwrap().unwrap().is_placeholder());

        document.body().append_child(ElementHandle::new("aside").with_id("sidebar"));
        let event = bus
            .wait_for(EventName::DomElementFound, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(event, AppEvent::DomElementFound { key: "sidebar".into() });
        assert_eq!(cache.get("sidebar").unwrap().unwrap().tag(), "aside");
    }

    #[tokio::test]
    async fn test_observer_swaps_placeholders_both_ways() {
        let bus = EventBus::default();
        let document = page(&[]);
        let mut cfg = config(&["modalOverlay"]);
        cfg.observe_mutations = true;
        cfg.retry_attempts = 0;
        let cache = ElementCache::new(document.clone(), bus.clone(), cfg);
        cache.init().unwrap();
        assert!(cache.stats().observer_active);

        let overlay = ElementHandle::new("div").with_id("modalOverlay");
        let wrapper = ElementHandle::new("section").with_child(overlay.clone());
        document.attach(&document.body(), wrapper.clone());
        bus.wait_for(EventName::DomElementReplaced, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(cache.get("modalOverlay").unwrap().unwrap(), overlay);

        document.detach(&wrapper);
        bus.wait_for(EventName::DomElementRemoved, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!cache.exists("modalOverlay"));
    }
}
