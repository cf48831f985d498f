//! Error types for prchecks-github

use thiserror::Error;

/// Errors raised while building a [`crate::GithubClient`].
///
/// Request-time failures are reported as [`prchecks_core::TransportError`].
#[derive(Error, Debug)]
pub enum GithubError {
    /// Token contains bytes that cannot appear in a header
    #[error("invalid token: not usable as an Authorization header")]
    InvalidToken,

    /// Empty token
    #[error("no token configured")]
    MissingToken,

    /// HTTP client construction failed
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
