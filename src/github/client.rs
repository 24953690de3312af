// GitHub API HTTP client.
// Handles authentication, rate limit tracking, and error classification.

use std::sync::{Mutex, PoisonError, RwLock};

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, StatsError};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Source of decoded JSON from the GitHub REST API.
///
/// The endpoint functions only depend on this seam, so they can run against
/// a scripted transport.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// GET `path` with query `params` and decode the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T>;
}

/// GitHub API client with an optional credential and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client without a credential.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Create a client that sends requests to `base_url` instead of api.github.com.
    pub(crate) fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("contribstats/", env!("CARGO_PKG_VERSION"))),
        );

        let mut builder = Client::builder().default_headers(headers);
        // Loopback targets never go through a system proxy.
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| StatsError::Unexpected(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Set the personal access token sent with every subsequent request.
    pub fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Rate limit headers from the most recent response.
    pub fn last_rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make a GET request to the GitHub API.
    ///
    /// Non-success statuses are classified into [`StatsError`] variants.
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.get(&url);

        if !params.is_empty() {
            request = request.query(params);
        }

        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        debug!(endpoint, "GET");
        let response = request.send().await?;

        self.update_rate_limit(response.headers());
        check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, headers: &HeaderMap) {
        let mut rate_limit = self.rate_limit.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(limit) = header_u64(headers, "x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header_u64(headers, RATE_LIMIT_REMAINING) {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }
}

impl Fetch for GitHubClient {
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(path, params).await?;

        // Empty repositories answer list endpoints with 204 and no body.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(serde_json::Value::Array(Vec::new()))?);
        }

        Ok(response.json().await?)
    }
}

fn is_loopback(base_url: &str) -> bool {
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| matches!(host, "localhost" | "127.0.0.1" | "[::1]")))
        .unwrap_or(false)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &headers, &body))
}

/// Map an unsuccessful HTTP response onto the error taxonomy.
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> StatsError {
    let rate_limited = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::FORBIDDEN if rate_limited => StatsError::RateLimitExceeded,
        StatusCode::NOT_FOUND => StatsError::NotFound,
        StatusCode::UNAUTHORIZED => StatsError::InvalidCredential,
        status => StatsError::Api(error_message(status, body)),
    }
}

/// Prefer GitHub's `{"message": ...}` body over the raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, message)
    }
}
