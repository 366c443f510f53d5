//! In-memory [`Document`] implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use crate::config::DomConfig;
use crate::traits::Document;

use super::element::ElementHandle;
use super::selector::Selector;

const MUTATION_CHANNEL_CAPACITY: usize = 256;

/// A structural change to the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Added(ElementHandle),
    Removed(ElementHandle),
}

/// Element tree rooted at `body`.
///
/// Structural changes made through [`MemoryDocument::attach`] and
/// [`MemoryDocument::detach`] are broadcast to mutation subscribers. Changes
/// made directly on element handles (text, classes, re-rendered children)
/// are not.
pub struct MemoryDocument {
    body: ElementHandle,
    ready: AtomicBool,
    mutations: Option<broadcast::Sender<Mutation>>,
}

impl MemoryDocument {
    /// An empty, ready document that reports mutations.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            body: ElementHandle::new("body"),
            ready: AtomicBool::new(true),
            mutations: Some(tx),
        }
    }

    /// A document that cannot report mutations, forcing polling.
    pub fn without_observer() -> Self {
        Self {
            mutations: None,
            ..Self::new()
        }
    }

    /// A document that is still loading.
    pub fn loading(self) -> Self {
        self.ready.store(false, Ordering::SeqCst);
        self
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// A page containing one element for every configured `#id` selector.
    pub fn library_page(config: &DomConfig) -> Self {
        let document = Self::new();
        for (key, selector) in &config.selectors {
            let id = selector.strip_prefix('#').unwrap_or(key);
            document.body.append_child(ElementHandle::new("div").with_id(id));
        }
        document
    }

    /// Append `child` under `parent` and notify observers.
    pub fn attach(&self, parent: &ElementHandle, child: ElementHandle) {
        parent.append_child(child.clone());
        self.notify(Mutation::Added(child));
    }

    /// Detach `element` from wherever it sits in the tree. Returns false if
    /// it was not attached.
    pub fn detach(&self, element: &ElementHandle) -> bool {
        let parent = std::iter::once(self.body.clone())
            .chain(self.body.descendants())
            .find(|node| node.children().contains(element));
        match parent {
            Some(parent) => {
                parent.remove_child(element);
                self.notify(Mutation::Removed(element.clone()));
                true
            }
            None => false,
        }
    }

    fn notify(&self, mutation: Mutation) {
        if let Some(tx) = &self.mutations {
            // No receivers is fine
            let _ = tx.send(mutation);
        }
    }

    fn parse(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for MemoryDocument {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn query(&self, selector: &str) -> Option<ElementHandle> {
        self.body.find(&Self::parse(selector)?)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementHandle> {
        Self::parse(selector)
            .map(|s| self.body.find_all(&s))
            .unwrap_or_default()
    }

    fn contains(&self, element: &ElementHandle) -> bool {
        self.body.contains(element)
    }

    fn body(&self) -> ElementHandle {
        self.body.clone()
    }

    fn mutations(&self) -> Option<broadcast::Receiver<Mutation>> {
        self.mutations.as_ref().map(|tx| tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_page_has_every_selector() {
        let config = DomConfig::default();
        let document = MemoryDocument::library_page(&config);
        for (_, selector) in &config.selectors {
            assert!(document.query(selector).is_some(), "missing {}", selector);
        }
    }

    #[tokio::test]
    async fn test_attach_and_detach_broadcast() {
        let document = MemoryDocument::new();
        let mut rx = document.mutations().unwrap();
        let grid = ElementHandle::new("div").with_id("booksGrid");

        document.attach(&document.body(), grid.clone());
        assert_eq!(rx.recv().await.unwrap(), Mutation::Added(grid.clone()));
        assert!(document.contains(&grid));

        assert!(document.detach(&grid));
        assert_eq!(rx.recv().await.unwrap(), Mutation::Removed(grid.clone()));
        assert!(!document.contains(&grid));
        assert!(!document.detach(&grid));
    }

    #[test]
    fn test_invalid_selector_queries_nothing() {
        let document = MemoryDocument::new();
        assert!(document.query("##").is_none());
        assert!(document.query_all("[x").is_empty());
    }

    #[test]
    fn test_without_observer() {
        assert!(MemoryDocument::without_observer().mutations().is_none());
        assert!(!MemoryDocument::new().loading().is_ready());
    }
}
