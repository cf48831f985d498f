//! GitHub REST client
//!
//! Implements pull request lookup against the REST API and signal retrieval
//! against either the same API or a proxy exposing the same paths.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use prchecks_core::{
    Page, PullRequestRef, PullRequestSource, RawCheckSignal, RawStatusSignal, RepoRef,
    SignalSource, TransportError,
};

use crate::config::GithubConfig;
use crate::error::GithubError;
use crate::pagination::parse_next_link;
use crate::wire::{CheckRunsPayload, CombinedStatusPayload, PullRequestPayload};

const API_VERSION: &str = "2022-11-28";

/// Check-runs requested per page.
pub const CHECK_RUNS_PER_PAGE: u32 = 100;

/// Open pull requests requested per branch lookup.
pub const BRANCH_LOOKUP_LIMIT: u32 = 5;

/// GitHub client for pull request and status signal reads
#[derive(Debug, Clone)]
pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    /// Create a client with authentication and API headers on every request.
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        if config.token.is_empty() {
            return Err(GithubError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("prchecks")),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(GithubClient { config, http })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn repo_url(base: &str, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", base, repo.owner, repo.name)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, TransportError> {
        request
            .send()
            .await
            .map_err(|err| transport_error(operation, err))
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, TransportError> {
        response
            .json::<T>()
            .await
            .map_err(|err| transport_error(operation, err))
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> TransportError {
    let operation = operation.to_string();
    if err.is_timeout() {
        TransportError::Timeout { operation }
    } else if err.is_decode() {
        TransportError::Decode {
            operation,
            message: err.to_string(),
        }
    } else {
        TransportError::Request {
            operation,
            message: err.to_string(),
        }
    }
}

fn check_status(operation: &str, response: &Response) -> Result<(), TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(TransportError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PullRequestSource for GithubClient {
    async fn pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<PullRequestRef>, TransportError> {
        const OP: &str = "get pull request";
        let url = format!("{}/pulls/{}", Self::repo_url(&self.config.api_url, repo), number);
        debug!(url = %url, "fetching pull request");

        let response = self.send(OP, self.http.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(OP, &response)?;
        let pr: PullRequestPayload = Self::decode(OP, response).await?;
        Ok(Some(pr.into()))
    }

    async fn open_pull_requests_for_branch(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Vec<PullRequestRef>, TransportError> {
        const OP: &str = "list pull requests";
        let url = format!("{}/pulls", Self::repo_url(&self.config.api_url, repo));
        let head = format!("{}:{}", repo.owner, branch);
        debug!(url = %url, head = %head, "looking up open pull requests");

        let request = self.http.get(&url).query(&[
            ("head", head.as_str()),
            ("state", "open"),
            ("per_page", &BRANCH_LOOKUP_LIMIT.to_string()),
        ]);
        let response = self.send(OP, request).await?;
        check_status(OP, &response)?;
        let prs: Vec<PullRequestPayload> = Self::decode(OP, response).await?;
        Ok(prs.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SignalSource for GithubClient {
    /// `page` is the absolute URL taken from the previous response's `Link`
    /// header.
    async fn check_runs_page(
        &self,
        repo: &RepoRef,
        sha: &str,
        page: Option<&str>,
    ) -> Result<Page<RawCheckSignal>, TransportError> {
        const OP: &str = "list check runs";
        let request = match page {
            Some(next) => self.http.get(next),
            None => {
                let url = format!(
                    "{}/commits/{}/check-runs",
                    Self::repo_url(self.config.signals_url(), repo),
                    sha
                );
                self.http
                    .get(url)
                    .query(&[("per_page", CHECK_RUNS_PER_PAGE.to_string())])
            }
        };

        let response = self.send(OP, request).await?;
        check_status(OP, &response)?;
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_link);
        let payload: CheckRunsPayload = Self::decode(OP, response).await?;

        Ok(Page {
            items: payload.check_runs.into_iter().map(Into::into).collect(),
            next,
        })
    }

    async fn combined_status(
        &self,
        repo: &RepoRef,
        sha: &str,
    ) -> Result<Vec<RawStatusSignal>, TransportError> {
        const OP: &str = "get combined status";
        let url = format!(
            "{}/commits/{}/status",
            Self::repo_url(self.config.signals_url(), repo),
            sha
        );

        let response = self.send(OP, self.http.get(&url)).await?;
        check_status(OP, &response)?;
        let payload: CombinedStatusPayload = Self::decode(OP, response).await?;
        Ok(payload.statuses.into_iter().map(Into::into).collect())
    }
}
