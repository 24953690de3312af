// Storage change notifications.
// Lets several views observe cache and history mutations without a global bus.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Which persisted list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    RecentSearches,
    Bookmarks,
}

/// A mutation of locally persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// A cache entry was written.
    CacheSet { key: String },
    /// Expired cache entries were purged.
    CacheExpired { keys: Vec<String> },
    /// The whole cache was dropped.
    CacheCleared,
    /// A history list was modified.
    HistoryChanged(HistoryKind),
}

/// Cloneable sender side of the storage event channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<StorageEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.sender.subscribe()
    }

    /// Emit an event. Having no subscribers is not an error.
    pub fn notify(&self, event: StorageEvent) {
        let _ = self.sender.send(event);
    }
}
