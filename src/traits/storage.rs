//! Key-value persistence abstraction.
//!
//! Stands in for browser local storage: theme, search history, the saved
//! book list and the settings blob all go through one [`KeyValueStore`].
//! Reads treat absent and corrupt values alike as empty.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Schema-free string storage keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value, returning `None` on any failure.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not read '{}' from storage: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring corrupt '{}' in storage: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryStore;

    #[test]
    fn test_load_json_round_trip() {
        let store = InMemoryStore::new();
        save_json(&store, "searchHistory", &vec!["dune", "foundation"]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, "searchHistory");
        assert_eq!(loaded.unwrap(), vec!["dune", "foundation"]);
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let store = InMemoryStore::new();
        store.set("myLibrary", "{not json").unwrap();
        let loaded: Option<Vec<i64>> = load_json(&store, "myLibrary");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_unavailable_store_reads_as_empty() {
        let store = InMemoryStore::unavailable();
        let loaded: Option<String> = load_json(&store, "theme");
        assert!(loaded.is_none());
    }
}
