// Scripted transport for exercising the endpoint functions offline.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{Result, StatsError};
use crate::github::client::{Fetch, classify};
use crate::github::types::Contributor;

/// Canned reply for one path.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// HTTP status with an optional `x-ratelimit-remaining` header.
    Status(u16, Option<&'static str>),
    Network(String),
}

#[derive(Default)]
pub struct MockFetch {
    routes: HashMap<String, (Reply, Duration)>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    completed: Mutex<Vec<String>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, reply: Reply) -> Self {
        self.route_delayed(path, reply, Duration::ZERO)
    }

    pub fn route_delayed(mut self, path: &str, reply: Reply, delay: Duration) -> Self {
        self.routes.insert(path.to_string(), (reply, delay));
        self
    }

    /// Paths requested, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| *p == path).count()
    }

    /// Query parameters of the first request to `path`.
    pub fn params_for(&self, path: &str) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, params)| params.clone())
            .unwrap_or_default()
    }

    /// Paths whose replies were delivered, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl Fetch for MockFetch {
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.calls.lock().unwrap().push((path.to_string(), params));

        let (reply, delay) = self
            .routes
            .get(path)
            .cloned()
            .unwrap_or((Reply::Status(404, None), Duration::ZERO));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(path.to_string());

        match reply {
            Reply::Json(value) => Ok(serde_json::from_value(value)?),
            Reply::Status(code, remaining) => {
                let mut headers = HeaderMap::new();
                if let Some(remaining) = remaining {
                    headers.insert("x-ratelimit-remaining", HeaderValue::from_static(remaining));
                }
                Err(classify(StatusCode::from_u16(code).unwrap(), &headers, ""))
            }
            Reply::Network(message) => Err(StatsError::Unexpected(message)),
        }
    }
}

pub fn contributor_json(login: &str, id: u64, contributions: u64) -> Value {
    json!({
        "login": login,
        "id": id,
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{}", id),
        "contributions": contributions,
        "type": "User"
    })
}

pub fn contributor(login: &str, contributions: u64) -> Contributor {
    Contributor {
        login: login.to_string(),
        id: contributions,
        avatar_url: String::new(),
        contributions,
        name: None,
        company: None,
        location: None,
    }
}

pub fn with_profile(
    login: &str,
    contributions: u64,
    company: Option<&str>,
    location: Option<&str>,
) -> Contributor {
    Contributor {
        company: company.map(str::to_string),
        location: location.map(str::to_string),
        ..contributor(login, contributions)
    }
}
