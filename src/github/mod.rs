// GitHub API module.
// Client, cache-aware endpoints, and contributor enrichment.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod enrich;
pub mod keys;
pub mod types;

pub use api::GitHubApi;
pub use client::{Fetch, GitHubClient};
pub use enrich::enrich_contributors;
pub use types::*;
