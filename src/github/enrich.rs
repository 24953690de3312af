// Contributor enrichment.
// Fans out one profile lookup per contributor and merges the results back in
// the original order.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::{Result, StatsError};

use super::api::GitHubApi;
use super::client::Fetch;
use super::keys;
use super::types::{Contributor, UserDetail};

/// Merge profile details into `contributors`, running at most
/// `max_concurrent` lookups at once.
///
/// Output order matches input order regardless of completion order. A failed
/// lookup leaves that contributor without profile fields.
pub async fn enrich_contributors<L, Fut>(
    contributors: Vec<Contributor>,
    max_concurrent: usize,
    lookup: L,
) -> Vec<Contributor>
where
    L: Fn(String) -> Fut,
    Fut: Future<Output = Result<UserDetail>>,
{
    stream::iter(contributors)
        .map(|contributor| {
            let details = lookup(contributor.login.clone());
            async move {
                match details.await {
                    Ok(details) => contributor.with_details(details),
                    Err(e) => {
                        warn!(
                            login = %contributor.login,
                            error = %e,
                            "Keeping contributor without details"
                        );
                        contributor
                    }
                }
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}

impl<F: Fetch> GitHubApi<F> {
    /// Get contributors with name, company, and location filled in.
    ///
    /// The combined list is cached under its own key, so a hit never touches
    /// the network. Failing to list contributors fails the whole call; failing
    /// to look up one user only degrades that contributor.
    pub async fn get_contributors_with_details(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Contributor>> {
        let key = keys::contributors_with_details(owner, repo);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key, "Cache hit");
            return Ok(hit);
        }

        let contributors = self.get_contributors(owner, repo).await?;
        debug!(count = contributors.len(), "Enriching contributors");

        let api = self;
        let enriched = enrich_contributors(
            contributors,
            self.config.max_concurrent_lookups,
            move |login| async move { api.lookup_user(&login).await },
        )
        .await;

        self.cache.set(&key, &enriched);
        Ok(enriched)
    }

    async fn lookup_user(&self, login: &str) -> Result<UserDetail> {
        let details = self.get_user_details(login);

        match self.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, details).await.map_err(|_| {
                StatsError::Unexpected(format!(
                    "lookup for {} timed out after {}ms",
                    login,
                    limit.as_millis()
                ))
            }),
            None => Ok(details.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::config::Config;
    use crate::error::StatsError;
    use crate::testutil::{MockFetch, Reply, contributor, contributor_json};

    use super::*;

    fn user_json(name: &str, company: &str, location: &str) -> serde_json::Value {
        json!({"name": name, "company": company, "location": location})
    }

    #[tokio::test]
    async fn test_failed_lookup_degrades_single_contributor() {
        let base = vec![contributor("a", 3), contributor("b", 2), contributor("c", 1)];

        let enriched = enrich_contributors(base.clone(), 30, |login| async move {
            if login == "b" {
                Err(StatsError::Unexpected("socket closed".to_string()))
            } else {
                Ok(UserDetail {
                    name: Some(login.to_uppercase()),
                    company: Some("Acme".to_string()),
                    location: None,
                })
            }
        })
        .await;

        let logins: Vec<_> = enriched.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, ["a", "b", "c"]);
        assert_eq!(enriched[0].company.as_deref(), Some("Acme"));
        assert_eq!(enriched[1], base[1]);
        assert_eq!(enriched[2].name.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn test_order_preserved_when_lookups_finish_out_of_order() {
        let delays = [("a", 30), ("b", 60), ("c", 5)];
        let base = vec![contributor("a", 3), contributor("b", 2), contributor("c", 1)];

        let enriched = enrich_contributors(base, 30, move |login| async move {
            let ms = delays.iter().find(|(l, _)| *l == login).map_or(0, |(_, ms)| *ms);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(UserDetail {
                location: Some(format!("{}-town", login)),
                ..UserDetail::unknown()
            })
        })
        .await;

        let locations: Vec<_> = enriched.iter().filter_map(|c| c.location.as_deref()).collect();
        assert_eq!(locations, ["a-town", "b-town", "c-town"]);
    }

    #[tokio::test]
    async fn test_zero_concurrency_limit_is_clamped() {
        let base = vec![contributor("a", 1), contributor("b", 1)];

        let enriched = enrich_contributors(base, 0, |_| async { Ok(UserDetail::unknown()) }).await;

        assert_eq!(enriched.len(), 2);
    }

    fn three_contributors() -> MockFetch {
        MockFetch::new().route(
            "/repos/acme/widget/contributors",
            Reply::Json(json!([
                contributor_json("a", 1, 30),
                contributor_json("b", 2, 20),
                contributor_json("c", 3, 10)
            ])),
        )
    }

    #[tokio::test]
    async fn test_enriches_through_api_in_order() {
        let fetch = three_contributors()
            .route_delayed(
                "/users/a",
                Reply::Json(user_json("Ann", "Acme", "Oslo")),
                Duration::from_millis(30),
            )
            .route_delayed(
                "/users/b",
                Reply::Json(user_json("Bob", "Initech", "Lima")),
                Duration::from_millis(60),
            )
            .route_delayed(
                "/users/c",
                Reply::Json(user_json("Cy", "Acme", "Pune")),
                Duration::from_millis(5),
            );
        let api = GitHubApi::with_fetch(fetch, Config::in_memory());

        let enriched = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();

        let names: Vec<_> = enriched.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, ["Ann", "Bob", "Cy"]);
        assert_eq!(enriched[1].company.as_deref(), Some("Initech"));
        assert_eq!(
            api.fetch.completed(),
            [
                "/repos/acme/widget/contributors",
                "/users/c",
                "/users/a",
                "/users/b"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_enriched_with_nothing() {
        let fetch = three_contributors()
            .route("/users/a", Reply::Json(user_json("Ann", "Acme", "Oslo")))
            .route("/users/b", Reply::Status(404, None))
            .route("/users/c", Reply::Json(user_json("Cy", "Acme", "Pune")));
        let api = GitHubApi::with_fetch(fetch, Config::in_memory());

        let enriched = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[1].login, "b");
        assert_eq!(enriched[1].company, None);
        assert_eq!(enriched[2].company.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_timed_out_lookup_keeps_base_record() {
        let fetch = three_contributors()
            .route("/users/a", Reply::Json(user_json("Ann", "Acme", "Oslo")))
            .route_delayed(
                "/users/b",
                Reply::Json(user_json("Bob", "Initech", "Lima")),
                Duration::from_millis(500),
            )
            .route("/users/c", Reply::Json(user_json("Cy", "Acme", "Pune")));
        let config = Config {
            lookup_timeout: Some(Duration::from_millis(50)),
            ..Config::in_memory()
        };
        let api = GitHubApi::with_fetch(fetch, config);

        let enriched = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();

        let logins: Vec<_> = enriched.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, ["a", "b", "c"]);
        assert_eq!(enriched[1].name, None);
        assert_eq!(enriched[1].contributions, 20);
        assert_eq!(enriched[0].name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_combined_result_is_cached() {
        let fetch = three_contributors()
            .route("/users/a", Reply::Json(user_json("Ann", "Acme", "Oslo")))
            .route("/users/b", Reply::Json(user_json("Bob", "Initech", "Lima")))
            .route("/users/c", Reply::Json(user_json("Cy", "Acme", "Pune")));
        let api = GitHubApi::with_fetch(fetch, Config::in_memory());

        let first = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();
        let calls = api.fetch.calls().len();
        let second = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls, 4);
        assert_eq!(api.fetch.calls().len(), calls);
        assert_eq!(
            api.cache
                .get::<Vec<Contributor>>("contributors_with_details:acme/widget"),
            Some(first)
        );
    }

    #[tokio::test]
    async fn test_seeded_combined_entry_skips_network() {
        let api = GitHubApi::with_fetch(MockFetch::new(), Config::in_memory());
        let seeded = vec![contributor("a", 3).with_details(UserDetail {
            company: Some("Acme".to_string()),
            ..UserDetail::unknown()
        })];
        api.cache
            .set("contributors_with_details:acme/widget", &seeded);

        let enriched = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap();

        assert_eq!(enriched, seeded);
        assert!(api.fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_fails_whole_call() {
        let fetch = MockFetch::new().route(
            "/repos/acme/widget/contributors",
            Reply::Status(403, Some("0")),
        );
        let api = GitHubApi::with_fetch(fetch, Config::in_memory());

        let err = api
            .get_contributors_with_details("acme", "widget")
            .await
            .unwrap_err();

        assert!(matches!(err, StatsError::RateLimitExceeded));
        assert!(api.cache.is_empty());
        assert_eq!(api.fetch.calls(), ["/repos/acme/widget/contributors"]);
    }
}
