//! Repository and pull request identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ChecksError, Result};

/// An `owner/name` repository identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`. Both halves must be non-empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match raw.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(ChecksError::Configuration(format!(
                "invalid repo format {raw:?}: use owner/repo"
            ))),
        }
    }
}

impl FromStr for RepoRef {
    type Err = ChecksError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A resolved pull request. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub head_sha: String,
    pub head_branch: String,
}

impl PullRequestRef {
    pub fn new(number: u64, head_sha: impl Into<String>, head_branch: impl Into<String>) -> Self {
        Self {
            number,
            head_sha: head_sha.into(),
            head_branch: head_branch.into(),
        }
    }

    /// Short form of the head commit (first 7 chars).
    pub fn short_sha(&self) -> &str {
        match self.head_sha.char_indices().nth(7) {
            Some((end, _)) => &self.head_sha[..end],
            None => &self.head_sha,
        }
    }
}
