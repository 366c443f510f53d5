//! Strategies for waiting on elements that were missing at startup.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;

use crate::config::DomConfig;
use crate::traits::Document;

use super::document::Mutation;
use super::element::ElementHandle;

/// Outcome of a resolve attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub element: Option<ElementHandle>,
    /// Lookups that came back empty before giving up or succeeding.
    pub failed_attempts: u32,
}

/// Waits for an element matching a selector to appear.
#[async_trait]
pub trait ElementResolver: Send + Sync {
    async fn resolve(&self, document: &dyn Document, selector: &str) -> Resolution;

    fn name(&self) -> &'static str;
}

/// Re-queries every `interval`, at most `attempts` times.
#[derive(Debug, Clone)]
pub struct PollingResolver {
    interval: Duration,
    attempts: u32,
}

impl PollingResolver {
    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self { interval, attempts }
    }

    pub fn from_config(config: &DomConfig) -> Self {
        Self::new(config.retry_interval, config.retry_attempts)
    }
}

#[async_trait]
impl ElementResolver for PollingResolver {
    async fn resolve(&self, document: &dyn Document, selector: &str) -> Resolution {
        for attempt in 0..self.attempts {
            tokio::time::sleep(self.interval).await;
            if let Some(element) = document.query(selector) {
                return Resolution {
                    element: Some(element),
                    failed_attempts: attempt,
                };
            }
            tracing::debug!(
                "{} still missing after attempt {}/{}",
                selector,
                attempt + 1,
                self.attempts
            );
        }
        Resolution {
            element: None,
            failed_attempts: self.attempts,
        }
    }

    fn name(&self) -> &'static str {
        "polling"
    }
}

/// Re-queries whenever the document reports an added element, for up to
/// `interval * attempts`. Falls back to polling when the document cannot
/// report mutations.
#[derive(Debug, Clone)]
pub struct ObserverResolver {
    fallback: PollingResolver,
    window: Duration,
}

impl ObserverResolver {
    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self {
            fallback: PollingResolver::new(interval, attempts),
            window: interval * attempts,
        }
    }

    pub fn from_config(config: &DomConfig) -> Self {
        Self::new(config.retry_interval, config.retry_attempts)
    }
}

#[async_trait]
impl ElementResolver for ObserverResolver {
    async fn resolve(&self, document: &dyn Document, selector: &str) -> Resolution {
        let Some(mut rx) = document.mutations() else {
            return self.fallback.resolve(document, selector).await;
        };

        // Subscribe first so nothing added between the query and the wait is lost
        if let Some(element) = document.query(selector) {
            return Resolution {
                element: Some(element),
                failed_attempts: 0,
            };
        }

        let mut failed_attempts = 1;
        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(Mutation::Added(_)) | Err(RecvError::Lagged(_)) => {
                        if let Some(element) = document.query(selector) {
                            return Some(element);
                        }
                        failed_attempts += 1;
                    }
                    Ok(Mutation::Removed(_)) => {}
                    Err(RecvError::Closed) => return None,
                }
            }
        };

        let element = tokio::time::timeout(self.window, wait).await.ok().flatten();
        Resolution {
            element,
            failed_attempts,
        }
    }

    fn name(&self) -> &'static str {
        "observer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_polling_gives_up() {
        let document = MemoryDocument::new();
        let resolver = PollingResolver::new(Duration::from_millis(1), 3);
        let resolution = resolver.resolve(&document, "#missing").await;
        assert!(resolution.element.is_none());
        assert_eq!(resolution.failed_attempts, 3);
    }

    #[tokio::test]
    async fn test_polling_finds_existing_element() {
        let document = MemoryDocument::new();
        document.body().append_child(ElementHandle::new("div").with_id("late"));
        let resolver = PollingResolver::new(Duration::from_millis(1), 3);
        let resolution = resolver.resolve(&document, "#late").await;
        assert!(resolution.element.is_some());
        assert_eq!(resolution.failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_observer_wakes_on_insert() {
        let document = Arc::new(MemoryDocument::new());
        let resolver = ObserverResolver::new(Duration::from_secs(5), 3);

        let inserter = {
            let document = document.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                document.attach(&document.body(), ElementHandle::new("span"));
                tokio::time::sleep(Duration::from_millis(10)).await;
                document.attach(&document.body(), ElementHandle::new("div").with_id("late"));
            })
        };

        let resolution = resolver.resolve(document.as_ref(), "#late").await;
        inserter.await.unwrap();
        assert_eq!(resolution.element.unwrap().id().as_deref(), Some("late"));
        assert_eq!(resolution.failed_attempts, 2);
    }

    #[tokio::test]
    async fn test_observer_times_out() {
        let document = MemoryDocument::new();
        let resolver = ObserverResolver::new(Duration::from_millis(5), 2);
        let resolution = resolver.resolve(&document, "#never").await;
        assert!(resolution.element.is_none());
    }
}
