//! Key-value store adapter.
//!
//! Every persisted record lives under one of four fixed keys as a JSON
//! document. Backends only move strings; the adapter owns encoding.
//!
//! Rules:
//!   - A missing key reads as absent.
//!   - A value that fails to decode reads as absent (logged, not fatal).
//!   - File writes are fsynced before returning.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreError;

/// The fixed keys shared with the browser dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Achievements,
    Profile,
    PendingApprovals,
    BlockchainCredentials,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Achievements,
        StorageKey::Profile,
        StorageKey::PendingApprovals,
        StorageKey::BlockchainCredentials,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Achievements => "studentCredoAchievements",
            StorageKey::Profile => "studentCredoProfile",
            StorageKey::PendingApprovals => "studentCredoPendingApprovals",
            StorageKey::BlockchainCredentials => "studentCredoBlockchainCredentials",
        }
    }
}

/// Synchronous string store. Single-threaded, like the browser storage
/// it stands in for.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ── Backends ───────────────────────────────────────────────────────

/// Volatile store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One file per key: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "key must match [a-zA-Z0-9_-]+"),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut file = File::create(&path).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// ── Adapter ────────────────────────────────────────────────────────

/// Typed JSON access to a backend by fixed key.
pub struct StoreAdapter {
    backend: Box<dyn KeyValueStore>,
}

impl StoreAdapter {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Decode the document under `key`. Missing, unreadable or malformed
    /// values all read as `None`.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = key.as_str(), "store miss");
                return None;
            }
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "store read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = key.as_str(), bytes = raw.len(), "store read");
                Some(value)
            }
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "corrupt stored value, treating as absent");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.as_str().to_string(),
            source,
        })?;
        self.backend.set(key.as_str(), &encoded)?;
        debug!(key = key.as_str(), bytes = encoded.len(), "store write");
        Ok(())
    }

    pub fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        self.backend.remove(key.as_str())
    }

    /// Raw access for callers that need to inspect stored text.
    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}
