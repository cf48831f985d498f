//! Upstream source abstractions.
//!
//! These traits define what the engine needs from the upstream API:
//! - `PullRequestSource`: pull request lookup by number or head branch
//! - `SignalSource`: paginated check-runs and the combined commit status
//!
//! Implementations report raw request failures as [`TransportError`]; the
//! engine decides how they map onto the domain taxonomy. In-memory fakes are
//! provided in the `fakes` module.

use async_trait::async_trait;

use crate::domain::{PullRequestRef, RawCheckSignal, RawStatusSignal, RepoRef, TransportError};

/// One page of a paginated collection plus the opaque continuation, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// A final page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Pull request lookup.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetch a pull request by number. `Ok(None)` when upstream reports no
    /// such pull request.
    async fn pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Option<PullRequestRef>, TransportError>;

    /// Open pull requests whose head is `<owner>:<branch>`, in upstream order.
    async fn open_pull_requests_for_branch(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<Vec<PullRequestRef>, TransportError>;
}

/// Status signal retrieval for a commit.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Fetch one page of check-runs. `page` is `None` for the first page and
    /// the previous page's `next` token afterwards.
    async fn check_runs_page(
        &self,
        repo: &RepoRef,
        sha: &str,
        page: Option<&str>,
    ) -> Result<Page<RawCheckSignal>, TransportError>;

    /// Fetch the combined status (single request, not paginated).
    async fn combined_status(
        &self,
        repo: &RepoRef,
        sha: &str,
    ) -> Result<Vec<RawStatusSignal>, TransportError>;
}
