use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use activity_events::{Event, RepoRef};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of repository events
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch up to `per_page` recent events for each repository and concatenate
    /// them in request order. Repositories that fail are skipped.
    async fn fetch_events(&self, repositories: &[String], per_page: u32) -> Result<Vec<Event>>;
}

/// GitHub REST API client
pub struct GitHubFetcher {
    config: FetcherConfig,
    client: Client,
    token: Option<String>,
}

impl GitHubFetcher {
    /// Create a new fetcher, reading the token from the configured variable
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let token = config.token();
        Self::with_token(config, token)
    }

    /// Create a new fetcher with an explicit token
    pub fn with_token(config: FetcherConfig, token: Option<String>) -> Result<Self> {
        config.validate().map_err(FetchError::Config)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        if token.is_none() {
            warn!(
                "No GitHub token found in {}, requests will be unauthenticated",
                config.token_env
            );
        }

        Ok(Self { config, client, token })
    }

    /// Get the configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    fn events_url(&self, repo: &RepoRef) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), repo.events_path())
    }

    /// Fetch one page of events for a single repository
    pub async fn fetch_repository(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<Event>> {
        let url = self.events_url(repo);
        debug!("Fetching events for {} from: {}", repo, url);

        let mut request = self.client.get(&url).query(&[("per_page", per_page)]);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Events request for {} returned {}", repo, status);

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        let records: Vec<Value> = response.json().await?;
        Ok(Event::decode_lenient(records))
    }
}

#[async_trait::async_trait]
impl EventSource for GitHubFetcher {
    async fn fetch_events(&self, repositories: &[String], per_page: u32) -> Result<Vec<Event>> {
        let mut all_events = Vec::new();
        let mut failed = 0usize;

        for raw in repositories {
            let repo: RepoRef = match raw.parse() {
                Ok(repo) => repo,
                Err(e) => {
                    warn!("Skipping repository: {}", e);
                    failed += 1;
                    continue;
                }
            };

            match self.fetch_repository(&repo, per_page).await {
                Ok(events) => {
                    debug!("Fetched {} events for {}", events.len(), repo);
                    all_events.extend(events);
                }
                Err(FetchError::Status { status, body }) => {
                    warn!("Error looking for events in {}: {} {}", repo, status, body);
                    failed += 1;
                }
                Err(e) => {
                    warn!("Error looking for events in {}: {}", repo, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Fetched {} events from {} repositories ({} failed)",
            all_events.len(),
            repositories.len(),
            failed
        );
        Ok(all_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use warp::Filter;

    /// Serve a fake events API on an ephemeral port.
    ///
    /// `octocat/hello` returns `per_page` events (at most 3), `octocat/broken`
    /// returns a body that is not a list, everything else is a 404. The
    /// Authorization header is echoed back in each event's payload.
    fn spawn_mock_api() -> SocketAddr {
        let events = warp::path!("repos" / String / String / "events")
            .and(warp::get())
            .and(warp::query::<HashMap<String, u32>>())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::header::<String>("user-agent"))
            .map(
                |owner: String,
                 name: String,
                 query: HashMap<String, u32>,
                 auth: Option<String>,
                 _agent: String| {
                    let full_name = format!("{owner}/{name}");
                    match full_name.as_str() {
                        "octocat/hello" => {
                            let count = query.get("per_page").copied().unwrap_or(30).min(3);
                            let records: Vec<Value> = (0..count)
                                .map(|i| {
                                    json!({
                                        "id": format!("{}", 500 - i),
                                        "type": "PushEvent",
                                        "repo": { "name": full_name },
                                        "payload": { "auth": auth },
                                        "created_at": format!("2024-02-0{}T12:00:00Z", 3 - i),
                                    })
                                })
                                .collect();
                            warp::reply::with_status(
                                warp::reply::json(&records),
                                warp::http::StatusCode::OK,
                            )
                        }
                        "octocat/broken" => warp::reply::with_status(
                            warp::reply::json(&json!({ "unexpected": true })),
                            warp::http::StatusCode::OK,
                        ),
                        _ => warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "Not Found" })),
                            warp::http::StatusCode::NOT_FOUND,
                        ),
                    }
                },
            );

        let (addr, server) = warp::serve(events).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn fetcher_for(addr: SocketAddr, token: Option<&str>) -> GitHubFetcher {
        let config = FetcherConfig { api_base_url: format!("http://{addr}"), ..Default::default() };
        GitHubFetcher::with_token(config, token.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_single_repository() {
        let addr = spawn_mock_api();
        let fetcher = fetcher_for(addr, Some("abc123"));

        let events = fetcher.fetch_events(&["octocat/hello".to_string()], 100).await.unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].id.to_string(), "500");
        assert_eq!(events[0].repo_name(), "octocat/hello");
        assert_eq!(events[0].payload["auth"], "token abc123");
    }

    #[tokio::test]
    async fn test_per_page_is_forwarded() {
        let addr = spawn_mock_api();
        let fetcher = fetcher_for(addr, None);

        let events = fetcher.fetch_events(&["octocat/hello".to_string()], 2).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_sends_no_authorization() {
        let addr = spawn_mock_api();
        let fetcher = fetcher_for(addr, None);

        let events = fetcher.fetch_events(&["octocat/hello".to_string()], 1).await.unwrap();
        assert!(events[0].payload["auth"].is_null());
    }

    #[tokio::test]
    async fn test_failing_repositories_are_skipped() {
        let addr = spawn_mock_api();
        let fetcher = fetcher_for(addr, Some("abc123"));

        let repos = vec![
            "octocat/missing".to_string(),
            "octocat/hello".to_string(),
            "octocat/broken".to_string(),
            "not-a-repo".to_string(),
        ];
        let events = fetcher.fetch_events(&repos, 100).await.unwrap();

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.repo_name() == "octocat/hello"));
    }

    #[tokio::test]
    async fn test_fetch_repository_reports_status() {
        let addr = spawn_mock_api();
        let fetcher = fetcher_for(addr, None);
        let repo: RepoRef = "octocat/missing".parse().unwrap();

        match fetcher.fetch_repository(&repo, 10).await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_no_events() {
        let config = FetcherConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let fetcher = GitHubFetcher::with_token(config, None).unwrap();

        let events = fetcher.fetch_events(&["octocat/hello".to_string()], 10).await.unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = FetcherConfig { api_base_url: "localhost".to_string(), ..Default::default() };
        assert!(matches!(GitHubFetcher::with_token(config, None), Err(FetchError::Config(_))));
    }
}
