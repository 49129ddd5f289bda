//! services/storefront/src/adapters/storage.rs
//!
//! Concrete implementations of the `KeyValueStore` port: an in-memory map for
//! tests and ephemeral sessions, and a directory of files that survives restarts.

use markethub_core::ports::{KeyValueStore, PortError, PortResult, StorageEvent};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

//=========================================================================================
// In-memory store
//=========================================================================================

/// A process-local store. Each instance is fully isolated.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        publish(&self.events, key);
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            publish(&self.events, key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

//=========================================================================================
// File-backed store
//=========================================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temporary file and a rename, so readers never see a
/// half-written value. Separate processes sharing a directory race with
/// last-writer-wins and receive no change events from each other.
pub struct FileStore {
    dir: PathBuf,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self { dir, events })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(format!("{}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| PortError::Storage(format!("{}: {}", key, e)))?;
        debug!(key, path = %path.display(), "Persisted storage key");
        publish(&self.events, key);
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                publish(&self.events, key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(format!("{}: {}", key, e))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

// Nobody listening is fine.
fn publish(events: &broadcast::Sender<StorageEvent>, key: &str) {
    let _ = events.send(StorageEvent { key: key.to_string() });
}
