//! prchecks-github: GitHub REST implementations of the prchecks sources
//!
//! [`GithubClient`] implements both [`prchecks_core::PullRequestSource`] and
//! [`prchecks_core::SignalSource`]. Pull requests are always read from the
//! REST API; the two signal endpoints may be routed through a read-only
//! proxy configured on [`GithubConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod wire;

pub use client::GithubClient;
pub use config::{GithubConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::GithubError;
pub use pagination::parse_next_link;
