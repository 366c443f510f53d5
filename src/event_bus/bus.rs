//! The publish/subscribe hub.
//!
//! Listeners are kept per event name, ordered by descending priority and
//! then by subscription order. The listener table lock is never held while
//! a handler runs, so handlers may freely subscribe, unsubscribe or publish.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::config::BusConfig;
use crate::error::{LibraryResult, SystemError};
use crate::util::lock;

use super::events::{AppEvent, EventName};
use super::types::{
    BusStats, Handler, HandlerFailure, HandlerOutcome, HandlerResult, ListenerInfo,
    PublishOptions, PublishResult, SubscribeOptions,
};

struct Listener {
    id: String,
    handler: Handler,
    options: SubscribeOptions,
    subscribed_at: chrono::DateTime<Utc>,
}

struct Metrics {
    total_events: u64,
    event_counts: HashMap<String, u64>,
    error_counts: HashMap<String, u64>,
    started: Instant,
}

impl Metrics {
    fn new() -> Self {
        Self {
            total_events: 0,
            event_counts: HashMap::new(),
            error_counts: HashMap::new(),
            started: Instant::now(),
        }
    }
}

struct BusInner {
    id: String,
    config: BusConfig,
    listeners: Mutex<HashMap<EventName, Vec<Listener>>>,
    metrics: Mutex<Metrics>,
}

impl BusInner {
    fn remove_listener(&self, event: &EventName, listener_id: &str) -> bool {
        let mut listeners = lock(&self.listeners);
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(|l| l.id == listener_id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            listeners.remove(event);
        }
        tracing::debug!("Unsubscribed {} from {}", listener_id, event);
        true
    }
}

/// Handle returned by `subscribe`. Dropping it leaves the listener
/// registered; call [`Subscription::unsubscribe`] to remove it.
#[derive(Clone)]
pub struct Subscription {
    bus: Weak<BusInner>,
    event: EventName,
    id: String,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Remove the listener. Returns false if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.remove_listener(&self.event, &self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

/// In-process event bus. Clones share the same listener table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new(config: BusConfig) -> Self {
        let id = format!("eventbus-{}", uuid::Uuid::new_v4().simple());
        tracing::debug!("Created event bus {}", id);
        Self {
            inner: Arc::new(BusInner {
                id,
                config,
                listeners: Mutex::new(HashMap::new()),
                metrics: Mutex::new(Metrics::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Subscribe a synchronous handler with default options.
    pub fn subscribe<F>(&self, event: EventName, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with(event, handler, SubscribeOptions::default())
    }

    /// Subscribe a synchronous handler.
    pub fn subscribe_with<F>(
        &self,
        event: EventName,
        handler: F,
        options: SubscribeOptions,
    ) -> Subscription
    where
        F: Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_listener(event, Handler::Sync(Arc::new(handler)), options)
    }

    /// Subscribe an async handler. Async handlers only run under
    /// [`EventBus::publish_async`]; synchronous publishes skip them.
    pub fn subscribe_async<F, Fut>(
        &self,
        event: EventName,
        handler: F,
        options: SubscribeOptions,
    ) -> Subscription
    where
        F: Fn(AppEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler = Arc::new(move |event: AppEvent| handler(event).boxed());
        self.add_listener(event, Handler::Async(handler), options)
    }

    /// Subscribe a handler that runs at most once.
    pub fn once<F>(&self, event: EventName, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe_with(event, handler, SubscribeOptions::once())
    }

    fn add_listener(
        &self,
        event: EventName,
        handler: Handler,
        options: SubscribeOptions,
    ) -> Subscription {
        let id = format!("listener-{}", uuid::Uuid::new_v4().simple());
        let listener = Listener {
            id: id.clone(),
            handler,
            options,
            subscribed_at: Utc::now(),
        };

        {
            let mut listeners = lock(&self.inner.listeners);
            let list = listeners.entry(event.clone()).or_default();
            if list.len() >= self.inner.config.max_listeners {
                tracing::warn!(
                    "Event {} has {} listeners (max {}), possible leak",
                    event,
                    list.len() + 1,
                    self.inner.config.max_listeners
                );
            }
            let position = list
                .iter()
                .position(|l| l.options.priority < options.priority)
                .unwrap_or(list.len());
            list.insert(position, listener);
        }

        tracing::debug!("Subscribed {} to {}", id, event);
        Subscription {
            bus: Arc::downgrade(&self.inner),
            event,
            id,
        }
    }

    /// Remove one listener by id.
    pub fn unsubscribe(&self, event: &EventName, listener_id: &str) -> bool {
        self.inner.remove_listener(event, listener_id)
    }

    /// Remove every listener for `event`, returning how many were removed.
    pub fn unsubscribe_all(&self, event: &EventName) -> usize {
        let removed = lock(&self.inner.listeners)
            .remove(event)
            .map(|list| list.len())
            .unwrap_or(0);
        if removed > 0 {
            tracing::debug!("Removed all {} listeners from {}", removed, event);
        }
        removed
    }

    /// Remove every listener and reset metrics.
    pub fn clear(&self) {
        let removed: usize = {
            let mut listeners = lock(&self.inner.listeners);
            let count = listeners.values().map(Vec::len).sum();
            listeners.clear();
            count
        };
        self.reset_metrics();
        tracing::info!("Event bus {} cleared ({} listeners)", self.inner.id, removed);
    }

    /// Publish synchronously with default options.
    pub fn publish(&self, event: AppEvent) -> PublishResult {
        self.publish_with(event, PublishOptions::default())
    }

    /// Publish synchronously: handlers run one after another in priority
    /// order on the caller's thread. Async handlers are counted as skipped.
    pub fn publish_with(&self, event: AppEvent, options: PublishOptions) -> PublishResult {
        let name = event.name();
        self.record_publish(&name);

        let snapshot = self.snapshot(&name);
        if snapshot.is_empty() {
            tracing::debug!("No listeners for {}", name);
            return PublishResult::empty();
        }

        let mut result = PublishResult::empty();
        let mut failures = Vec::new();

        for (id, handler, once) in snapshot {
            let Handler::Sync(handler) = handler else {
                result.skipped_count += 1;
                continue;
            };
            // A once-listener consumed by a nested publish must not run twice.
            if once && !self.inner.remove_listener(&name, &id) {
                continue;
            }

            let started = Instant::now();
            let outcome = flatten_panic(catch_unwind(AssertUnwindSafe(|| handler(&event))));
            let elapsed = started.elapsed();

            match outcome {
                Ok(()) => {
                    result.executed_count += 1;
                    result.results.push(HandlerOutcome {
                        listener_id: id,
                        elapsed,
                    });
                }
                Err(error) => {
                    self.record_failure(&name, &id, &error);
                    failures.push((id.clone(), error.clone()));
                    result.errors.push(HandlerFailure {
                        listener_id: id,
                        error,
                        elapsed,
                    });
                    if options.stop_on_error {
                        result.success = false;
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            "{}: {} ok, {} failed, {} skipped",
            name,
            result.executed_count,
            result.errors.len(),
            result.skipped_count
        );

        self.report_failures(&name, failures);
        result
    }

    /// Publish to every handler concurrently with the bus default timeout.
    pub async fn publish_async(&self, event: AppEvent) -> PublishResult {
        self.publish_async_with(event, PublishOptions::default())
            .await
    }

    /// Publish to every handler (sync and async) concurrently. Each handler
    /// is raced against the timeout; a handler that loses is recorded as a
    /// failure. `stop_on_error` does not apply.
    pub async fn publish_async_with(&self, event: AppEvent, options: PublishOptions) -> PublishResult {
        let name = event.name();
        self.record_publish(&name);
        let timeout = options.timeout.unwrap_or(self.inner.config.async_timeout);

        let runnable: Vec<(String, Handler)> = self
            .snapshot(&name)
            .into_iter()
            .filter(|(id, _, once)| !*once || self.inner.remove_listener(&name, id))
            .map(|(id, handler, _)| (id, handler))
            .collect();

        if runnable.is_empty() {
            tracing::debug!("No listeners for {}", name);
            return PublishResult::empty();
        }

        let runs = runnable.into_iter().map(|(id, handler)| {
            let event = event.clone();
            async move {
                let started = Instant::now();
                let outcome = tokio::time::timeout(timeout, run_handler(handler, event))
                    .await
                    .unwrap_or_else(|_| {
                        Err(format!("handler timed out after {} ms", timeout.as_millis()))
                    });
                (id, outcome, started.elapsed())
            }
        });

        let mut result = PublishResult::empty();
        let mut failures = Vec::new();
        for (id, outcome, elapsed) in futures::future::join_all(runs).await {
            match outcome {
                Ok(()) => {
                    result.executed_count += 1;
                    result.results.push(HandlerOutcome {
                        listener_id: id,
                        elapsed,
                    });
                }
                Err(error) => {
                    self.record_failure(&name, &id, &error);
                    failures.push((id.clone(), error.clone()));
                    result.errors.push(HandlerFailure {
                        listener_id: id,
                        error,
                        elapsed,
                    });
                }
            }
        }

        tracing::debug!(
            "{} (async): {} ok, {} failed",
            name,
            result.executed_count,
            result.errors.len()
        );

        self.report_failures(&name, failures);
        result
    }

    /// Wait for the next occurrence of `event`.
    pub async fn wait_for(&self, event: EventName, timeout: Duration) -> LibraryResult<AppEvent> {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let subscription = self.once(event.clone(), move |payload| {
            if let Some(tx) = lock(&tx).take() {
                let _ = tx.send(payload.clone());
            }
            Ok(())
        });

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(SystemError::Other {
                message: format!("listener for '{}' was removed while waiting", event),
            }
            .into()),
            Err(_) => {
                subscription.unsubscribe();
                Err(SystemError::Timeout {
                    what: format!("event '{}'", event),
                    duration_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }

    pub fn listener_count(&self, event: &EventName) -> usize {
        lock(&self.inner.listeners)
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Names of every event that currently has listeners.
    pub fn events(&self) -> Vec<EventName> {
        let mut events: Vec<EventName> = lock(&self.inner.listeners).keys().cloned().collect();
        events.sort();
        events
    }

    pub fn listeners_info(&self, event: &EventName) -> Vec<ListenerInfo> {
        lock(&self.inner.listeners)
            .get(event)
            .map(|list| {
                list.iter()
                    .map(|l| ListenerInfo {
                        id: l.id.clone(),
                        priority: l.options.priority,
                        once: l.options.once,
                        is_async: l.handler.is_async(),
                        subscribed_at: l.subscribed_at,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn stats(&self) -> BusStats {
        let (total_listeners, active_events) = {
            let listeners = lock(&self.inner.listeners);
            (listeners.values().map(Vec::len).sum(), listeners.len())
        };
        let metrics = lock(&self.inner.metrics);
        let uptime = metrics.started.elapsed();

        BusStats {
            id: self.inner.id.clone(),
            uptime,
            total_events: metrics.total_events,
            total_listeners,
            active_events,
            event_counts: metrics.event_counts.clone().into_iter().collect(),
            error_counts: metrics.error_counts.clone().into_iter().collect(),
        }
    }

    pub fn reset_metrics(&self) {
        *lock(&self.inner.metrics) = Metrics::new();
    }

    fn snapshot(&self, name: &EventName) -> Vec<(String, Handler, bool)> {
        lock(&self.inner.listeners)
            .get(name)
            .map(|list| {
                list.iter()
                    .map(|l| (l.id.clone(), l.handler.clone(), l.options.once))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record_publish(&self, name: &EventName) {
        let mut metrics = lock(&self.inner.metrics);
        metrics.total_events += 1;
        *metrics
            .event_counts
            .entry(name.as_str().to_string())
            .or_insert(0) += 1;
    }

    fn record_failure(&self, name: &EventName, listener_id: &str, error: &str) {
        *lock(&self.inner.metrics)
            .error_counts
            .entry(name.as_str().to_string())
            .or_insert(0) += 1;
        tracing::error!("Handler {} failed on {}: {}", listener_id, name, error);
    }

    /// Re-publish handler failures as `eventbus:error`, except for failures
    /// of `eventbus:error` handlers themselves.
    fn report_failures(&self, name: &EventName, failures: Vec<(String, String)>) {
        if *name == EventName::EventBusError {
            return;
        }
        for (listener_id, error) in failures {
            self.publish(AppEvent::EventBusError {
                original_event: name.as_str().to_string(),
                listener_id,
                error,
                timestamp: Utc::now(),
            });
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

async fn run_handler(handler: Handler, event: AppEvent) -> Result<(), String> {
    match handler {
        Handler::Sync(handler) => flatten_panic(catch_unwind(AssertUnwindSafe(|| handler(&event)))),
        Handler::Async(handler) => {
            let future = match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(future) => future,
                Err(panic) => return Err(panic_message(panic)),
            };
            flatten_panic(AssertUnwindSafe(future).catch_unwind().await)
        }
    }
}

fn flatten_panic(
    outcome: Result<HandlerResult, Box<dyn Any + Send>>,
) -> Result<(), String> {
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.message),
        Err(panic) => Err(panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::HandlerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&AppEvent) -> HandlerResult + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |tag: &str| {
            let log = log_clone.clone();
            let tag = tag.to_string();
            Box::new(move |_: &AppEvent| {
                log.lock().unwrap().push(tag.clone());
                Ok(())
            }) as Box<dyn Fn(&AppEvent) -> HandlerResult + Send + Sync>
        };
        (log, make)
    }

    #[test]
    fn test_priority_then_subscription_order() {
        let bus = EventBus::default();
        let (log, make) = recorder();

        bus.subscribe_with(EventName::AppStarted, make("low-1"), SubscribeOptions::default());
        bus.subscribe_with(
            EventName::AppStarted,
            make("high"),
            SubscribeOptions::default().with_priority(10),
        );
        bus.subscribe_with(EventName::AppStarted, make("low-2"), SubscribeOptions::default());
        bus.subscribe_with(
            EventName::AppStarted,
            make("mid"),
            SubscribeOptions::default().with_priority(5),
        );

        bus.publish(AppEvent::AppStarted);
        assert_eq!(*log.lock().unwrap(), vec!["high", "mid", "low-1", "low-2"]);
    }

    #[test]
    fn test_once_runs_a_single_time() {
        let bus = EventBus::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        bus.once(EventName::AppStarted, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(AppEvent::AppStarted);
        bus.publish(AppEvent::AppStarted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(&EventName::AppStarted), 0);
    }

    #[test]
    fn test_failing_handler_does_not_block_siblings() {
        let bus = EventBus::default();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.subscribe_with(
            EventName::AppStarted,
            |_| Err(HandlerError::new("boom")),
            SubscribeOptions::default().with_priority(1),
        );
        let c = calls.clone();
        bus.subscribe(EventName::AppStarted, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = bus.publish(AppEvent::AppStarted);
        assert!(result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.errors[0].error, "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_on_error() {
        let bus = EventBus::default();
        let calls = Arc::new(AtomicUsize::new(0));

        bus.subscribe(EventName::AppStarted, |_| Err(HandlerError::new("first")));
        let c = calls.clone();
        bus.subscribe(EventName::AppStarted, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = bus.publish_with(AppEvent::AppStarted, PublishOptions::stop_on_error());
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_handler_is_reported() {
        let bus = EventBus::default();
        bus.subscribe(EventName::AppStarted, |_| panic!("kaboom"));

        let result = bus.publish(AppEvent::AppStarted);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].error.contains("kaboom"));
    }

    #[test]
    fn test_failures_republished_without_recursion() {
        let bus = EventBus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        bus.subscribe(EventName::EventBusError, move |event| {
            if let AppEvent::EventBusError { original_event, .. } = event {
                s.lock().unwrap().push(original_event.clone());
            }
            Err(HandlerError::new("error handler also fails"))
        });
        bus.subscribe(EventName::AppStarted, |_| Err(HandlerError::new("boom")));

        bus.publish(AppEvent::AppStarted);
        assert_eq!(*seen.lock().unwrap(), vec!["app:started".to_string()]);

        let stats = bus.stats();
        assert_eq!(stats.error_counts.get("app:started"), Some(&1));
        assert_eq!(stats.error_counts.get("eventbus:error"), Some(&1));
    }

    #[test]
    fn test_handlers_may_unsubscribe_during_dispatch() {
        let bus = EventBus::default();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let s = slot.clone();
        let sub = bus.subscribe(EventName::AppStarted, move |_| {
            if let Some(sub) = s.lock().unwrap().take() {
                sub.unsubscribe();
            }
            Ok(())
        });
        *slot.lock().unwrap() = Some(sub);

        bus.publish(AppEvent::AppStarted);
        assert_eq!(bus.listener_count(&EventName::AppStarted), 0);
    }

    #[test]
    fn test_sync_publish_skips_async_handlers() {
        let bus = EventBus::default();
        bus.subscribe_async(
            EventName::AppStarted,
            |_| async { Ok(()) },
            SubscribeOptions::default(),
        );
        let result = bus.publish(AppEvent::AppStarted);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.executed_count, 0);
    }

    #[tokio::test]
    async fn test_async_publish_times_out_slow_handler() {
        let bus = EventBus::default();
        bus.subscribe_async(
            EventName::AppStarted,
            |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            SubscribeOptions::default(),
        );
        bus.subscribe(EventName::AppStarted, |_| Ok(()));

        let result = bus
            .publish_async_with(
                AppEvent::AppStarted,
                PublishOptions::default().with_timeout(Duration::from_millis(20)),
            )
            .await;
        assert_eq!(result.executed_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].error.contains("timed out"));
    }

    #[tokio::test]
    async fn test_wait_for_receives_payload() {
        let bus = EventBus::default();
        let waiter = {
            let bus = bus.clone();
            tokio::spawn(async move {
                bus.wait_for(EventName::BooksLoaded, Duration::from_secs(5))
                    .await
            })
        };

        // Let the waiter register before publishing.
        while bus.listener_count(&EventName::BooksLoaded) == 0 {
            tokio::task::yield_now().await;
        }
        bus.publish(AppEvent::BooksLoaded { count: 3 });

        let event = waiter.await.unwrap().unwrap();
        assert_eq!(event, AppEvent::BooksLoaded { count: 3 });
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let bus = EventBus::default();
        let err = bus
            .wait_for(EventName::BooksLoaded, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "E_SYS_TIMEOUT");
        assert_eq!(bus.listener_count(&EventName::BooksLoaded), 0);
    }

    #[test]
    fn test_unsubscribe_all_and_stats() {
        let bus = EventBus::default();
        bus.subscribe(EventName::UiSidebarOpen, |_| Ok(()));
        bus.subscribe(EventName::UiSidebarOpen, |_| Ok(()));
        bus.subscribe(EventName::UiSidebarClose, |_| Ok(()));
        bus.publish(AppEvent::UiSidebarOpen);

        let stats = bus.stats();
        assert_eq!(stats.total_listeners, 3);
        assert_eq!(stats.active_events, 2);
        assert_eq!(stats.total_events, 1);

        assert_eq!(bus.unsubscribe_all(&EventName::UiSidebarOpen), 2);
        assert_eq!(bus.events(), vec![EventName::UiSidebarClose]);

        bus.clear();
        assert_eq!(bus.stats().total_listeners, 0);
        assert_eq!(bus.stats().total_events, 0);
    }

    #[test]
    fn test_listeners_info() {
        let bus = EventBus::default();
        bus.subscribe_with(
            EventName::AppStarted,
            |_| Ok(()),
            SubscribeOptions::once().with_priority(3),
        );
        let info = bus.listeners_info(&EventName::AppStarted);
        assert_eq!(info.len(), 1);
        assert!(info[0].once);
        assert_eq!(info[0].priority, 3);
        assert!(!info[0].is_async);
    }
}
