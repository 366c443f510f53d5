//! The reader's saved books (`myLibrary`) and the settings blob
//! (`digitalLibrarySettings`).
//!
//! Both are read opportunistically: absent or corrupt values start empty
//! or default, and failed writes only log a warning.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::storage_keys;
use crate::traits::storage::{load_json, save_json};
use crate::traits::KeyValueStore;

/// Saved book ids, in the order they were added.
pub struct MyLibrary {
    book_ids: Vec<i64>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl MyLibrary {
    pub fn new() -> Self {
        Self {
            book_ids: Vec::new(),
            storage: None,
        }
    }

    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let book_ids: Vec<i64> =
            load_json(storage.as_ref(), storage_keys::MY_LIBRARY).unwrap_or_default();
        Self {
            book_ids,
            storage: Some(storage),
        }
    }

    pub fn contains(&self, book_id: i64) -> bool {
        self.book_ids.contains(&book_id)
    }

    /// Add or remove `book_id`. Returns true if the book is now saved.
    pub fn toggle(&mut self, book_id: i64) -> bool {
        let saved = if self.contains(book_id) {
            self.book_ids.retain(|id| *id != book_id);
            false
        } else {
            self.book_ids.push(book_id);
            true
        };
        self.persist();
        saved
    }

    pub fn book_ids(&self) -> &[i64] {
        &self.book_ids
    }

    pub fn len(&self) -> usize {
        self.book_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book_ids.is_empty()
    }

    fn persist(&self) {
        if let Some(storage) = &self.storage {
            if let Err(e) = save_json(storage.as_ref(), storage_keys::MY_LIBRARY, &self.book_ids) {
                tracing::warn!("Could not save my library: {}", e);
            }
        }
    }
}

impl Default for MyLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader preferences. Unknown fields in the saved blob are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub books_per_page: usize,
    pub show_ratings: bool,
    pub realtime_search: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            books_per_page: 12,
            show_ratings: true,
            realtime_search: true,
            language: "en".to_string(),
        }
    }
}

impl Settings {
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        load_json(storage, storage_keys::SETTINGS).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn KeyValueStore) {
        if let Err(e) = save_json(storage, storage_keys::SETTINGS, self) {
            tracing::warn!("Could not save settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryStore;

    #[test]
    fn test_toggle_persists() {
        let storage = Arc::new(InMemoryStore::new());
        let mut library = MyLibrary::load(storage.clone());
        assert!(library.toggle(4));
        assert!(library.toggle(9));
        assert!(!library.toggle(4));

        let reloaded = MyLibrary::load(storage);
        assert_eq!(reloaded.book_ids(), &[9]);
    }

    #[test]
    fn test_corrupt_library_starts_empty() {
        let storage = Arc::new(InMemoryStore::new().with_value("myLibrary", "[1, \"x\""));
        assert!(MyLibrary::load(storage).is_empty());
    }

    #[test]
    fn test_settings_partial_blob() {
        let storage = InMemoryStore::new()
            .with_value("digitalLibrarySettings", r#"{"showRatings": false, "extra": 1}"#);
        let settings = Settings::load(&storage);
        assert!(!settings.show_ratings);
        assert_eq!(settings.books_per_page, 12);
    }

    #[test]
    fn test_settings_unavailable_storage() {
        let storage = InMemoryStore::unavailable();
        assert_eq!(Settings::load(&storage), Settings::default());
        Settings::default().save(&storage);
    }
}
