//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// GitHub client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL, used for pull request lookups
    pub api_url: String,
    /// Optional proxy base URL serving the check-run and status endpoints
    pub proxy_url: Option<String>,
    /// Bearer token
    pub token: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    pub user_agent: String,
}

impl GithubConfig {
    /// Config for the public API with the given token.
    pub fn new(token: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            proxy_url: None,
            token: token.trim().to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("prchecks/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Point pull request lookups at another REST endpoint.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = trim_base(api_url);
        self
    }

    /// Route signal requests through a proxy.
    pub fn with_proxy_url(mut self, proxy_url: &str) -> Self {
        let trimmed = trim_base(proxy_url);
        self.proxy_url = (!trimmed.is_empty()).then_some(trimmed);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL for the check-run and status endpoints.
    pub fn signals_url(&self) -> &str {
        self.proxy_url.as_deref().unwrap_or(&self.api_url)
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GithubConfig::new("  tok  ");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token, "tok");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.signals_url(), DEFAULT_API_URL);
        assert!(config.user_agent.starts_with("prchecks/"));
    }

    #[test]
    fn test_proxy_routes_signals_only() {
        let config = GithubConfig::new("tok").with_proxy_url("https://proxy.example.com/");
        assert_eq!(config.proxy_url.as_deref(), Some("https://proxy.example.com"));
        assert_eq!(config.signals_url(), "https://proxy.example.com");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_blank_proxy_is_ignored() {
        let config = GithubConfig::new("tok").with_proxy_url("   ");
        assert_eq!(config.proxy_url, None);
        assert_eq!(config.signals_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = GithubConfig::new("tok").with_api_url("http://127.0.0.1:8080//");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }
}
