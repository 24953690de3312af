// Cache store for API responses.
// Keeps a keyed map of timestamped JSON values, swept on every read and
// persisted as a single file after every mutation.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::events::{Notifier, StorageEvent};

/// One cached value with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl CacheEntry {
    pub fn new(data: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            data,
        }
    }

    /// Check if this entry is older than `ttl` at `now`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.timestamp)
            .to_std()
            // Timestamps in the future count as fresh.
            .unwrap_or(Duration::ZERO);

        elapsed > ttl
    }
}

/// Key/value cache with a fixed expiration window.
#[derive(Debug)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    path: Option<PathBuf>,
    ttl: Duration,
    notifier: Notifier,
}

impl CacheStore {
    /// Open a store persisted at `path`.
    /// Missing or unreadable content yields an empty store.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration, notifier: Notifier) -> Self {
        let path = path.into();
        let entries = load_entries(&path);

        let store = Self {
            entries: Mutex::new(entries),
            path: Some(path),
            ttl,
            notifier,
        };

        let mut entries = store.lock();
        store.sweep(&mut entries);
        drop(entries);

        store
    }

    /// Create a store that never touches the filesystem.
    pub fn in_memory(ttl: Duration, notifier: Notifier) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            path: None,
            ttl,
            notifier,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a cached value if present and not expired.
    /// A value that no longer matches `T` counts as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        self.sweep(&mut entries);

        let entry = entries.get(key)?;
        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring cache entry with unexpected shape");
                None
            }
        }
    }

    /// Insert or overwrite `key` and persist the store.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache value");
                return;
            }
        };

        let mut entries = self.lock();
        entries.insert(key.to_string(), CacheEntry::new(data));
        self.persist(&entries);
        drop(entries);

        self.notifier.notify(StorageEvent::CacheSet {
            key: key.to_string(),
        });
    }

    /// Drop every entry and delete the persisted file.
    pub fn clear(&self) {
        self.lock().clear();

        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove cache file"),
            }
        }

        self.notifier.notify(StorageEvent::CacheCleared);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let mut entries = self.lock();
        self.sweep(&mut entries);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an entry with an explicit timestamp.
    #[cfg(test)]
    pub(crate) fn insert_at(&self, key: &str, data: Value, timestamp: DateTime<Utc>) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), CacheEntry { timestamp, data });
        self.persist(&entries);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove expired entries, persisting only when something was removed.
    fn sweep(&self, entries: &mut HashMap<String, CacheEntry>) {
        let now = Utc::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired.is_empty() {
            return;
        }

        for key in &expired {
            entries.remove(key);
        }
        debug!(count = expired.len(), "Purged expired cache entries");

        self.persist(entries);
        self.notifier
            .notify(StorageEvent::CacheExpired { keys: expired });
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = write_entries(path, entries) {
            warn!(path = %path.display(), error = %e, "Failed to save cache");
        }
    }
}

fn load_entries(path: &Path) -> HashMap<String, CacheEntry> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cache, starting empty");
            return HashMap::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt cache file, starting empty");
            HashMap::new()
        }
    }
}

fn write_entries(path: &Path, entries: &HashMap<String, CacheEntry>) -> io::Result<()> {
    let json = serde_json::to_vec(entries)?;
    write_atomic(path, &json)
}

/// Write `bytes` to `path` via a temp file, creating parent directories.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
