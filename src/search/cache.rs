//! Memoization cache for search results
//!
//! Results are keyed by the normalized query plus the filter set. The
//! cache is bounded; the least recently used key is evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::models::Book;

/// Bounded result cache with hit/miss counters.
pub struct SearchCache {
    /// Cached result lists keyed by query and filters
    entries: HashMap<String, Arc<Vec<Book>>>,
    /// Use order for eviction (least recent first)
    order: VecDeque<String>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `key`, counting a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<Vec<Book>>> {
        match self.entries.get(key) {
            Some(results) => {
                self.hits += 1;
                let results = results.clone();
                self.touch(key);
                Some(results)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: String, results: Arc<Vec<Book>>) {
        if self.entries.contains_key(&key) {
            self.touch(&key);
        } else {
            // Evict least recently used entries if at capacity
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, results);
    }

    fn touch(&mut self, key: &str) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(position) {
                self.order.push_back(k);
            }
        }
    }

    /// Get cache statistics (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
