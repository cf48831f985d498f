//! Pull request selector parsing and resolution.
//!
//! A selector is one of:
//! - empty: the current local branch
//! - `42` / `#42`: a pull request number
//! - `https://github.com/owner/repo/pull/42[/...]`: a pull request URL
//! - anything else: a head branch name

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ChecksError, PullRequestRef, RepoRef, Result};
use crate::obs;
use crate::source::PullRequestSource;

static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
static PULL_URL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn number_pattern() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"^#?(\d+)$").expect("valid number pattern"))
}

fn pull_url_pattern() -> &'static Regex {
    PULL_URL_PATTERN.get_or_init(|| Regex::new(r"/pull/(\d+)").expect("valid pull URL pattern"))
}

/// A parsed pull request selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestSelector {
    CurrentBranch,
    Number(u64),
    Branch(String),
}

impl PullRequestSelector {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::CurrentBranch);
        }

        if let Some(caps) = number_pattern().captures(raw) {
            return parse_number(raw, &caps[1]).map(Self::Number);
        }

        if raw.starts_with("https://") || raw.starts_with("http://") {
            if let Some(caps) = pull_url_pattern().captures(raw) {
                return parse_number(raw, &caps[1]).map(Self::Number);
            }
        }

        let branch = raw.strip_prefix('#').unwrap_or(raw);
        if branch.is_empty() {
            return Err(ChecksError::InvalidSelector {
                selector: raw.to_string(),
                reason: "empty branch name".to_string(),
            });
        }
        Ok(Self::Branch(branch.to_string()))
    }
}

fn parse_number(raw: &str, digits: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|e| ChecksError::InvalidSelector {
            selector: raw.to_string(),
            reason: format!("pull request number out of range: {e}"),
        })
}

impl fmt::Display for PullRequestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentBranch => write!(f, "current branch"),
            Self::Number(n) => write!(f, "#{n}"),
            Self::Branch(b) => write!(f, "branch {b}"),
        }
    }
}

/// Resolve `selector` to exactly one pull request.
///
/// `current_branch` is only consulted for [`PullRequestSelector::CurrentBranch`]
/// and is expected to fail with [`ChecksError::NoBranchDetected`].
pub async fn resolve_pull_request<S, F>(
    source: &S,
    repo: &RepoRef,
    selector: &PullRequestSelector,
    current_branch: F,
) -> Result<PullRequestRef>
where
    S: PullRequestSource + ?Sized,
    F: FnOnce() -> Result<String>,
{
    let pr = match selector {
        PullRequestSelector::CurrentBranch => {
            let branch = current_branch()?;
            find_by_branch(source, repo, &branch).await?
        }
        PullRequestSelector::Number(number) => source
            .pull_request(repo, *number)
            .await?
            .ok_or(ChecksError::PullRequestNotFound { number: *number })?,
        PullRequestSelector::Branch(branch) => find_by_branch(source, repo, branch).await?,
    };

    obs::emit_pr_resolved(&selector.to_string(), &pr);
    Ok(pr)
}

async fn find_by_branch<S>(source: &S, repo: &RepoRef, branch: &str) -> Result<PullRequestRef>
where
    S: PullRequestSource + ?Sized,
{
    source
        .open_pull_requests_for_branch(repo, branch)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ChecksError::NoOpenPullRequest {
            branch: branch.to_string(),
            repo: repo.to_string(),
        })
}
