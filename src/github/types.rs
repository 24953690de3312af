// GitHub API response types.
// Defines the snapshots cached and returned by the endpoint functions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// License attached to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

/// GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub license: Option<License>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub subscribers_count: u64,
}

impl Repository {
    pub fn license_name(&self) -> Option<&str> {
        self.license.as_ref().map(|l| l.name.as_str())
    }
}

/// Repository contributor, optionally enriched with profile fields.
///
/// `None` profile fields mean "unknown": either the user left them blank or
/// the lookup for that user did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub contributions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Contributor {
    /// Copy of this contributor with profile fields taken from `details`.
    pub fn with_details(self, details: UserDetail) -> Self {
        Self {
            name: details.name,
            company: details.company,
            location: details.location,
            ..self
        }
    }
}

/// Profile fields of a GitHub user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

impl UserDetail {
    /// Placeholder for a user whose profile could not be fetched.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Rate limit window reported by `/rate_limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

/// Raw `rate` object from `/rate_limit`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RateWindow {
    pub limit: u64,
    pub remaining: u64,
    /// Unix seconds.
    pub reset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub rate: RateWindow,
}

impl RateWindow {
    pub fn into_info(self) -> RateLimitInfo {
        RateLimitInfo {
            limit: self.limit,
            remaining: self.remaining,
            reset: DateTime::from_timestamp(self.reset, 0).unwrap_or_default(),
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
