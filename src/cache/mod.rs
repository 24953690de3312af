// Cache module for API responses.
// A single persisted key/value file with a fixed expiration window.

pub mod paths;
pub mod store;

pub use paths::*;
pub use store::{CacheEntry, CacheStore};
