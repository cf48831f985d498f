//! Domain-level error taxonomy for prchecks.

use std::fmt;

/// Which of the two per-cycle signal calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalCall {
    CheckRuns,
    CombinedStatus,
}

impl fmt::Display for SignalCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalCall::CheckRuns => write!(f, "check runs"),
            SignalCall::CombinedStatus => write!(f, "commit status"),
        }
    }
}

/// Failures reported by a source implementation for a single request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{operation}: upstream returned {status}")]
    Status { operation: String, status: u16 },

    #[error("{operation}: failed to decode response: {message}")]
    Decode { operation: String, message: String },

    #[error("{operation}: request timed out")]
    Timeout { operation: String },

    #[error("{operation}: request failed: {message}")]
    Request { operation: String, message: String },
}

/// Coarse classification of a [`ChecksError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network activity.
    Configuration,
    /// The selector could not be turned into a pull request.
    Resolution,
    /// An upstream request failed.
    Transport,
}

/// prchecks domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ChecksError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no PR selector provided and could not detect current branch: {0}")]
    NoBranchDetected(String),

    #[error(
        "pull request #{number} not found (verify the PR number and that the token has \
         Metadata: read access to the repository)"
    )]
    PullRequestNotFound { number: u64 },

    #[error("no open pull request found for branch {branch:?} in {repo}")]
    NoOpenPullRequest { branch: String, repo: String },

    #[error("invalid pull request selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("fetching {call}: {source}")]
    Fetch {
        call: SignalCall,
        #[source]
        source: TransportError,
    },

    #[error("finding PR: {0}")]
    Transport(#[from] TransportError),
}

impl ChecksError {
    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChecksError::Configuration(_) => ErrorKind::Configuration,
            ChecksError::NoBranchDetected(_)
            | ChecksError::PullRequestNotFound { .. }
            | ChecksError::NoOpenPullRequest { .. }
            | ChecksError::InvalidSelector { .. } => ErrorKind::Resolution,
            ChecksError::Fetch { .. } | ChecksError::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// Result type for prchecks domain operations.
pub type Result<T> = std::result::Result<T, ChecksError>;
