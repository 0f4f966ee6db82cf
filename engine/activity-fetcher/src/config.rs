use activity_events::DEFAULT_PER_PAGE;
use serde::{Deserialize, Serialize};

/// Configuration for the GitHub events client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Base URL of the REST API
    pub api_base_url: String,

    /// Name of the environment variable holding the access token
    pub token_env: String,

    /// User-Agent header sent with every request (required by GitHub)
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Events requested per repository when the caller does not say
    pub default_per_page: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            user_agent: format!("repo-activity-tracker/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FetcherConfig {
    /// Get the access token from the environment, if set
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|token| !token.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(format!("Invalid API base URL: {}", self.api_base_url));
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if self.default_per_page == 0 {
            return Err("default_per_page must be greater than 0".to_string());
        }

        Ok(())
    }
}
