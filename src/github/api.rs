// Explicit handle over the transport, cache, and storage notifications.
// Every endpoint call goes through one of these; dropping it disposes of it.

use tokio::sync::broadcast;

use crate::cache::{self, CacheStore};
use crate::config::Config;
use crate::error::Result;
use crate::events::{HistoryKind, Notifier, StorageEvent};
use crate::history::HistoryStore;

use super::client::{Fetch, GitHubClient};

/// GitHub API context: a transport plus the cache in front of it.
pub struct GitHubApi<F = GitHubClient> {
    pub(super) fetch: F,
    pub(super) cache: CacheStore,
    pub(super) config: Config,
    notifier: Notifier,
    recent_searches: HistoryStore,
    bookmarks: HistoryStore,
}

impl GitHubApi<GitHubClient> {
    /// Create a handle backed by the real GitHub client.
    /// The configured token, if any, is applied before the first request.
    pub fn new(config: Config) -> Result<Self> {
        let client = GitHubClient::new()?;
        if let Some(token) = &config.token {
            client.set_token(token);
        }
        Ok(Self::with_fetch(client, config))
    }

    /// Set the credential used by every subsequent request.
    pub fn set_token(&self, token: &str) {
        self.fetch.set_token(token);
    }

    /// Underlying client, for raw diagnostic requests.
    pub fn client(&self) -> &GitHubClient {
        &self.fetch
    }
}

impl<F: Fetch> GitHubApi<F> {
    /// Create a handle over any transport.
    pub fn with_fetch(fetch: F, config: Config) -> Self {
        let notifier = Notifier::new();
        let cache = match &config.cache_dir {
            Some(dir) => CacheStore::open(
                cache::api_cache_path(dir),
                config.cache_ttl,
                notifier.clone(),
            ),
            None => CacheStore::in_memory(config.cache_ttl, notifier.clone()),
        };

        let recent_searches = history_store(&config, HistoryKind::RecentSearches, &notifier);
        let bookmarks = history_store(&config, HistoryKind::Bookmarks, &notifier);

        Self {
            fetch,
            cache,
            config,
            notifier,
            recent_searches,
            bookmarks,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Receive cache and history mutations made through this handle.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.notifier.subscribe()
    }

    /// Recent searches list sharing this handle's storage and notifications.
    pub fn recent_searches(&self) -> &HistoryStore {
        &self.recent_searches
    }

    /// Bookmarks list sharing this handle's storage and notifications.
    pub fn bookmarks(&self) -> &HistoryStore {
        &self.bookmarks
    }
}

fn history_store(config: &Config, kind: HistoryKind, notifier: &Notifier) -> HistoryStore {
    let path = config.cache_dir.as_deref().map(|dir| match kind {
        HistoryKind::RecentSearches => cache::recent_searches_path(dir),
        HistoryKind::Bookmarks => cache::bookmarks_path(dir),
    });
    HistoryStore::new(kind, path, config.history_limit, notifier.clone())
}
