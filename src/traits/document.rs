//! Document abstraction for the element cache and UI controller.
//!
//! A [`Document`] answers selector queries and, optionally, reports tree
//! mutations. The in-memory implementation lives in `crate::dom`.

use tokio::sync::broadcast;

use crate::dom::{ElementHandle, Mutation};

pub trait Document: Send + Sync {
    /// Whether the document has finished loading.
    fn is_ready(&self) -> bool;

    /// First attached element matching `selector`.
    fn query(&self, selector: &str) -> Option<ElementHandle>;

    /// Every attached element matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementHandle>;

    /// Whether `element` is currently attached to the document.
    fn contains(&self, element: &ElementHandle) -> bool;

    /// The root container that holds the page.
    fn body(&self) -> ElementHandle;

    /// Subscribe to tree mutations. `None` when the document cannot report
    /// them, in which case callers fall back to polling.
    fn mutations(&self) -> Option<broadcast::Receiver<Mutation>>;
}
