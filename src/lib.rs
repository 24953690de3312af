// Contributor statistics for GitHub repositories.
// Cache-aware GitHub API access plus company and location summaries.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod github;
pub mod history;
pub mod stats;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use error::{Result, StatsError};
pub use events::{HistoryKind, Notifier, StorageEvent};
pub use github::{Contributor, GitHubApi, GitHubClient, RateLimitInfo, Repository, UserDetail};
pub use history::{HistoryEntry, HistoryStore};
pub use stats::{SummaryItem, company_summary, location_summary};
