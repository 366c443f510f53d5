//! Debounced realtime search.
//!
//! Keystrokes are coalesced (last-intent-wins) and published as one
//! `search:query:changed` once typing has paused for the debounce window.
//! A single background task serves any number of keystrokes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::event_bus::{AppEvent, EventBus};
use crate::util::lock;

#[derive(Default)]
struct Pending {
    query: Option<String>,
    last_input: Option<Instant>,
    task_running: bool,
}

/// Trailing-edge debouncer for the search box.
#[derive(Clone)]
pub struct SearchDebouncer {
    bus: EventBus,
    pending: Arc<Mutex<Pending>>,
    window: Duration,
}

impl SearchDebouncer {
    pub fn new(bus: EventBus, window: Duration) -> Self {
        Self {
            bus,
            pending: Arc::new(Mutex::new(Pending::default())),
            window,
        }
    }

    /// Queue `query`. Without a tokio runtime the query is published at once.
    pub fn request(&self, query: &str) {
        let should_spawn = {
            let mut pending = lock(&self.pending);
            pending.query = Some(query.to_string());
            pending.last_input = Some(Instant::now());
            if pending.task_running {
                false
            } else {
                pending.task_running = true;
                true
            }
        };

        if should_spawn {
            self.spawn_task();
        }
    }

    /// Drop any queued query.
    pub fn cancel(&self) {
        let mut pending = lock(&self.pending);
        pending.query = None;
        pending.last_input = None;
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).query.is_some()
    }

    fn spawn_task(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            let query = {
                let mut pending = lock(&self.pending);
                pending.task_running = false;
                pending.last_input = None;
                pending.query.take()
            };
            if let Some(query) = query {
                publish(&self.bus, query);
            }
            return;
        };

        let pending = Arc::clone(&self.pending);
        let bus = self.bus.clone();
        let window = self.window;
        handle.spawn(async move {
            loop {
                let last_input = lock(&pending).last_input;
                let deadline = match last_input {
                    Some(last) => last + window,
                    None => {
                        lock(&pending).task_running = false;
                        break;
                    }
                };
                tokio::time::sleep_until(deadline).await;

                let ready = {
                    let mut state = lock(&pending);
                    match state.last_input {
                        // Typing resumed during the sleep
                        Some(last) if last + window > Instant::now() => None,
                        _ => {
                            state.last_input = None;
                            state.task_running = false;
                            Some(state.query.take())
                        }
                    }
                };

                if let Some(query) = ready {
                    if let Some(query) = query {
                        publish(&bus, query);
                    }
                    break;
                }
            }
        });
    }
}

fn publish(bus: &EventBus, query: String) {
    tracing::debug!("Debounced search for {:?}", query);
    bus.publish(AppEvent::SearchQueryChanged {
        query,
        submit: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::event_bus::EventName;

    fn recorder(bus: &EventBus) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(EventName::SearchQueryChanged, move |event| {
            if let AppEvent::SearchQueryChanged { query, submit } = event {
                assert!(!submit);
                sink.lock().unwrap().push(query.clone());
            }
            Ok(())
        });
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_coalesce() {
        let bus = EventBus::new(BusConfig::default());
        let seen = recorder(&bus);
        let debouncer = SearchDebouncer::new(bus, Duration::from_millis(300));

        debouncer.request("d");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.request("du");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.request("dune");
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["dune"]);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_query() {
        let bus = EventBus::new(BusConfig::default());
        let seen = recorder(&bus);
        let debouncer = SearchDebouncer::new(bus, Duration::from_millis(300));

        debouncer.request("dune");
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(seen.lock().unwrap().is_empty());

        debouncer.request("cosmos");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["cosmos"]);
    }

    #[test]
    fn test_without_runtime_publishes_immediately() {
        let bus = EventBus::new(BusConfig::default());
        let seen = recorder(&bus);
        let debouncer = SearchDebouncer::new(bus, Duration::from_millis(300));
        debouncer.request("dune");
        assert_eq!(*seen.lock().unwrap(), vec!["dune"]);
    }
}
