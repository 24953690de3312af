// Cache path utilities.
// Resolves where the API cache and history lists live on disk.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// File holding the serialized API cache map.
pub const CACHE_FILE_NAME: &str = "github_api_cache.json";

/// Get the base cache directory (~/.cache/contribstats on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "contribstats").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the API cache file inside `dir`.
pub fn api_cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILE_NAME)
}

/// Path to the recent searches list inside `dir`.
pub fn recent_searches_path(dir: &Path) -> PathBuf {
    dir.join("recent_searches.json")
}

/// Path to the bookmarks list inside `dir`.
pub fn bookmarks_path(dir: &Path) -> PathBuf {
    dir.join("bookmarks.json")
}
