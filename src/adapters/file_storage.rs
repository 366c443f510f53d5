//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk (`storage.json` under the
//! user's data directory by default). The file is read once on open and
//! rewritten on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;
use crate::traits::KeyValueStore;
use crate::util::lock;

const STORAGE_FILE: &str = "storage.json";
const APP_DIR: &str = "libris";

/// Roughly what browsers allow per origin.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    quota: usize,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store in the per-user data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| StorageError::Unavailable {
                reason: "could not determine data directory".to_string(),
            })?;
        Self::open(dir.join(STORAGE_FILE))
    }

    /// Open (or lazily create) the store at `path`.
    ///
    /// A corrupt file is logged and treated as empty; it is overwritten on
    /// the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Storage file {:?} is corrupt, starting empty: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StorageError::Io {
                    path,
                    message: e.to_string(),
                })
            }
        };

        Ok(Self {
            path,
            quota: DEFAULT_QUOTA_BYTES,
            entries: Mutex::new(entries),
        })
    }

    /// Override the total size limit.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let encoded = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            key: STORAGE_FILE.to_string(),
            message: e.to_string(),
        })?;

        // Write to a sibling file then rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);

        let previous = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let size = Self::used_bytes(&entries) - previous + key.len() + value.len();
        if size > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size,
                limit: self.quota,
            });
        }

        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
