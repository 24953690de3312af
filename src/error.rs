// Error types for contribstats.
// Classifies GitHub API failures into user-facing messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    #[error("Repository not found. Please check the owner and repository name.")]
    NotFound,

    #[error("Invalid GitHub token. Please check your access token.")]
    InvalidCredential,

    /// Any other HTTP error status returned by the API.
    #[error("GitHub API error: {0}")]
    Api(String),

    /// Failure that never produced an HTTP status (network, decoding, bad header).
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl StatsError {
    /// True for errors that carry an HTTP status from GitHub.
    pub fn is_http(&self) -> bool {
        matches!(
            self,
            StatsError::RateLimitExceeded
                | StatsError::NotFound
                | StatsError::InvalidCredential
                | StatsError::Api(_)
        )
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        StatsError::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Unexpected(format!("invalid response body: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
