//! DOM Element Cache and the in-memory document it reads from.
//!
//! - [`ElementHandle`]: a shared element node
//! - [`MemoryDocument`]: a [`crate::traits::Document`] backed by an element tree
//! - [`ElementResolver`]: polling or observer-based wait for late elements
//! - [`ElementCache`]: named element lookups with placeholders

mod cache;
mod document;
mod element;
mod resolver;
mod selector;

pub use cache::{DomStats, ElementCache};
pub use document::{MemoryDocument, Mutation};
pub use element::{ElementHandle, PLACEHOLDER_CLASS};
pub use resolver::{ElementResolver, ObserverResolver, PollingResolver, Resolution};
pub use selector::Selector;
