// Runtime configuration.
// Collects the credential, cache location, and fetch limits in one place.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache;

/// Cache entries older than this are treated as absent.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Contributors requested per repository (first page only).
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Maximum number of entries kept in each history list.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`GitHubApi`](crate::GitHubApi) handle.
#[derive(Debug, Clone)]
pub struct Config {
    /// Personal access token sent as `Authorization: token <value>`.
    pub token: Option<String>,
    /// Directory holding the cache and history files. `None` keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub per_page: u32,
    /// Upper bound on concurrent per-user lookups during enrichment.
    pub max_concurrent_lookups: usize,
    /// Per-user lookup deadline during enrichment. `None` waits indefinitely.
    pub lookup_timeout: Option<Duration>,
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            cache_dir: cache::cache_dir(),
            cache_ttl: DEFAULT_CACHE_TTL,
            per_page: DEFAULT_PER_PAGE,
            max_concurrent_lookups: DEFAULT_PER_PAGE as usize,
            lookup_timeout: Some(DEFAULT_LOOKUP_TIMEOUT),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Build a configuration from `GITHUB_TOKEN` and `CONTRIBSTATS_CACHE_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(token) = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
        {
            config.token = Some(token);
        }

        if let Some(dir) = std::env::var_os("CONTRIBSTATS_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Configuration with no on-disk state.
    pub fn in_memory() -> Self {
        Self {
            cache_dir: None,
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}
