//! Command configuration: flags, environment and git, resolved once before
//! any network activity.

use std::time::Duration;

use clap::Args;

use prchecks_core::{ChecksError, RepoRef, Result, WatchOptions};
use prchecks_github::{GithubConfig, DEFAULT_API_URL};

/// Environment variables consulted for the token, in priority order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

pub const PROXY_URL_ENV_VAR: &str = "GH_CHECKPROXY_URL";

/// Connection flags shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Repository in owner/repo format (auto-detected from the origin remote)
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// GitHub token (or $GH_TOKEN / $GITHUB_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Proxy base URL for check-run and status requests (or $GH_CHECKPROXY_URL)
    #[arg(long, value_name = "URL")]
    pub proxy_url: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout (e.g. 15s, 1m)
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "15s",
        value_parser = humantime::parse_duration
    )]
    pub timeout: Duration,
}

/// Polling flags for the `checks` command.
#[derive(Debug, Clone, Args)]
pub struct PollArgs {
    /// Watch checks until they finish
    #[arg(long)]
    pub watch: bool,

    /// Exit on the first failure in watch mode (requires --watch)
    #[arg(long)]
    pub fail_fast: bool,

    /// Refresh interval in watch mode (e.g. 10s, 1m30s)
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub interval: Duration,
}

/// Fully resolved connection settings.
#[derive(Debug, Clone)]
pub struct Connection {
    pub repo: RepoRef,
    pub github: GithubConfig,
}

impl ConnectionArgs {
    /// Resolve the token, endpoints and repository.
    ///
    /// `env` looks up an environment variable; `detect_repo` is only called
    /// when `--repo` is absent.
    pub fn resolve<E, D>(&self, env: E, detect_repo: D) -> Result<Connection>
    where
        E: Fn(&str) -> Option<String>,
        D: FnOnce() -> Option<RepoRef>,
    {
        let token = first_non_empty(
            self.token.clone(),
            TOKEN_ENV_VARS.iter().map(|name| env(*name)),
        )
        .ok_or_else(|| {
            ChecksError::Configuration(
                "no token: set GH_TOKEN, GITHUB_TOKEN, or use --token".to_string(),
            )
        })?;

        if self.timeout.is_zero() {
            return Err(ChecksError::Configuration(
                "--timeout must be greater than zero".to_string(),
            ));
        }

        let repo = match self.repo.as_deref() {
            Some(raw) => RepoRef::parse(raw)?,
            None => detect_repo().ok_or_else(|| {
                ChecksError::Configuration(
                    "could not detect repository: use --repo owner/repo".to_string(),
                )
            })?,
        };

        let mut github = GithubConfig::new(&token)
            .with_api_url(&self.api_url)
            .with_timeout(self.timeout);
        if let Some(proxy) = first_non_empty(self.proxy_url.clone(), [env(PROXY_URL_ENV_VAR)]) {
            github = github.with_proxy_url(&proxy);
        }

        Ok(Connection { repo, github })
    }
}

impl PollArgs {
    /// Build and validate the loop options.
    pub fn resolve(&self) -> Result<WatchOptions> {
        let options = WatchOptions {
            watch: self.watch,
            fail_fast: self.fail_fast,
            interval: self.interval,
        };
        options.validate()?;
        Ok(options)
    }
}

fn first_non_empty<I>(flag: Option<String>, rest: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    std::iter::once(flag)
        .chain(rest)
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
