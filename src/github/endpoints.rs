// GitHub API endpoint functions.
// Each consults the cache, falls through to the transport on a miss, and
// caches successful results.

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::Result;

use super::api::GitHubApi;
use super::client::Fetch;
use super::keys;
use super::types::{Contributor, RateLimitInfo, RateLimitResponse, Repository, UserDetail};

impl<F: Fetch> GitHubApi<F> {
    /// Get repository metadata.
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        self.cached(
            &keys::repository(owner, repo),
            &format!("/repos/{}/{}", owner, repo),
            &[],
        )
        .await
    }

    /// Get the first page of contributors, in the API's default order.
    pub async fn get_contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>> {
        let params = [("per_page", self.config.per_page.to_string())];
        self.cached(
            &keys::contributors(owner, repo),
            &format!("/repos/{}/{}/contributors", owner, repo),
            &params,
        )
        .await
    }

    /// Get a user's profile fields, propagating failures.
    pub async fn fetch_user_details(&self, username: &str) -> Result<UserDetail> {
        self.cached(&keys::user(username), &format!("/users/{}", username), &[])
            .await
    }

    /// Get a user's profile fields, or all-unknown fields if the lookup fails.
    /// Failures are not cached.
    pub async fn get_user_details(&self, username: &str) -> UserDetail {
        self.fetch_user_details(username)
            .await
            .unwrap_or_else(|e| {
                warn!(username, error = %e, "Error fetching user details");
                UserDetail::unknown()
            })
    }

    /// Get the current rate limit window.
    pub async fn get_rate_limit(&self) -> Result<RateLimitInfo> {
        if let Some(info) = self.cache.get(keys::RATE_LIMIT) {
            debug!(key = keys::RATE_LIMIT, "Cache hit");
            return Ok(info);
        }

        let info = self.fetch_rate_limit().await?;
        self.cache.set(keys::RATE_LIMIT, &info);
        Ok(info)
    }

    /// Check the credential against `/rate_limit`, bypassing the cache.
    pub async fn validate_token(&self) -> Result<RateLimitInfo> {
        self.fetch_rate_limit().await
    }

    async fn fetch_rate_limit(&self) -> Result<RateLimitInfo> {
        let response: RateLimitResponse = self.fetch.get_json("/rate_limit", &[]).await?;
        Ok(response.rate.into_info())
    }

    async fn cached<T>(&self, key: &str, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(hit) = self.cache.get(key) {
            debug!(key, "Cache hit");
            return Ok(hit);
        }

        debug!(key, "Cache miss");
        let value: T = self.fetch.get_json(path, params).await?;
        self.cache.set(key, &value);
        Ok(value)
    }
}
