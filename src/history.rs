// Recent searches and bookmarks.
// Short, most-recent-first lists of repositories persisted next to the cache.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::store::write_atomic;
use crate::events::{HistoryKind, Notifier, StorageEvent};
use crate::github::Repository;

/// A repository the user looked at or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `{owner}/{repo}`; unique within a list.
    pub id: String,
    pub owner: String,
    pub repo: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub repository: Repository,
}

/// One persisted history list.
///
/// Without a path the list lives only as long as the store.
#[derive(Debug)]
pub struct HistoryStore {
    kind: HistoryKind,
    path: Option<PathBuf>,
    limit: usize,
    notifier: Notifier,
    memory: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new(kind: HistoryKind, path: Option<PathBuf>, limit: usize, notifier: Notifier) -> Self {
        Self {
            kind,
            path,
            limit,
            notifier,
            memory: Mutex::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    /// Entries, most recent first. Unreadable content reads as empty.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        match &self.path {
            Some(path) => read_entries(path),
            None => self.lock().clone(),
        }
    }

    /// Move `owner/repo` to the front of the list, dropping the oldest
    /// entries beyond the limit.
    pub fn record(&self, owner: &str, repo: &str, repository: &Repository) {
        let entry = HistoryEntry {
            id: format!("{}/{}", owner, repo),
            owner: owner.to_string(),
            repo: repo.to_string(),
            timestamp: Utc::now(),
            repository: repository.clone(),
        };

        let mut entries = self.entries();
        entries.retain(|e| e.id != entry.id);
        entries.insert(0, entry);
        entries.truncate(self.limit);

        self.save(entries);
    }

    /// Remove the entry with `id`, if any.
    pub fn remove(&self, id: &str) {
        let mut entries = self.entries();
        entries.retain(|e| e.id != id);
        self.save(entries);
    }

    /// Drop the whole list.
    pub fn clear(&self) {
        match &self.path {
            Some(path) => match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove history"),
            },
            None => self.lock().clear(),
        }

        self.notifier.notify(StorageEvent::HistoryChanged(self.kind));
    }

    fn save(&self, entries: Vec<HistoryEntry>) {
        match &self.path {
            Some(path) => {
                let result = serde_json::to_vec(&entries)
                    .map_err(io::Error::from)
                    .and_then(|json| write_atomic(path, &json));
                if let Err(e) = result {
                    warn!(path = %path.display(), error = %e, "Failed to save history");
                }
            }
            None => *self.lock() = entries,
        }

        self.notifier.notify(StorageEvent::HistoryChanged(self.kind));
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_entries(path: &Path) -> Vec<HistoryEntry> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read history");
            return Vec::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Corrupt history file");
        Vec::new()
    })
}
