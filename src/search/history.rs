//! Search history, persisted under `searchHistory`.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::storage_keys;
use crate::traits::storage::{load_json, save_json};
use crate::traits::KeyValueStore;

/// Submitted queries, newest first, without duplicates.
pub struct SearchHistory {
    entries: VecDeque<String>,
    max_size: usize,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl SearchHistory {
    /// In-memory history.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
            storage: None,
        }
    }

    /// History backed by `storage`, starting from whatever was saved.
    ///
    /// Missing or corrupt saved data starts an empty history.
    pub fn load(storage: Arc<dyn KeyValueStore>, max_size: usize) -> Self {
        let saved: Vec<String> =
            load_json(storage.as_ref(), storage_keys::SEARCH_HISTORY).unwrap_or_default();

        let mut entries = VecDeque::new();
        for query in saved {
            let query = query.trim().to_string();
            if !query.is_empty() && !entries.contains(&query) && entries.len() < max_size {
                entries.push_back(query);
            }
        }

        Self {
            entries,
            max_size,
            storage: Some(storage),
        }
    }

    /// Record a query at the front. A repeated query moves to the front.
    pub fn add(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.entries.retain(|q| q != query);
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.max_size);
        self.persist();
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let entries: Vec<&String> = self.entries.iter().collect();
        if let Err(e) = save_json(storage.as_ref(), storage_keys::SEARCH_HISTORY, &entries) {
            tracing::warn!("Could not save search history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryStore;

    #[test]
    fn test_newest_first_deduplicated_and_capped() {
        let mut history = SearchHistory::new(10);
        for i in 0..12 {
            history.add(&format!("query {}", i));
        }
        history.add("query 5");

        let entries = history.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], "query 5");
        assert_eq!(entries.iter().filter(|q| *q == "query 5").count(), 1);
    }

    #[test]
    fn test_blank_queries_ignored() {
        let mut history = SearchHistory::new(10);
        history.add("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let storage = Arc::new(InMemoryStore::new());
        let mut history = SearchHistory::load(storage.clone(), 10);
        history.add("dune");
        history.add("foundation");

        let reloaded = SearchHistory::load(storage, 10);
        assert_eq!(reloaded.entries(), vec!["foundation", "dune"]);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let storage = Arc::new(InMemoryStore::new().with_value("searchHistory", "{broken"));
        assert!(SearchHistory::load(storage, 10).is_empty());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_memory() {
        let storage = Arc::new(InMemoryStore::unavailable());
        let mut history = SearchHistory::load(storage, 10);
        history.add("dune");
        assert_eq!(history.entries(), vec!["dune"]);
    }
}
