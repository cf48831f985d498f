//! Signal fetching: both collections for one commit, pagination followed to
//! exhaustion.

use crate::domain::{
    ChecksError, RawCheckSignal, RawStatusSignal, RepoRef, Result, SignalCall,
};
use crate::obs;
use crate::source::SignalSource;

/// Both raw collections for one commit, as fetched in a single cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    pub check_runs: Vec<RawCheckSignal>,
    pub statuses: Vec<RawStatusSignal>,
}

/// Fetch every check-run page, then the combined status.
///
/// There is no page cap: the loop stops only when a page carries no
/// continuation. Any failure discards everything fetched so far.
pub async fn fetch_signals<S>(source: &S, repo: &RepoRef, sha: &str) -> Result<SignalSnapshot>
where
    S: SignalSource + ?Sized,
{
    let mut check_runs = Vec::new();
    let mut next: Option<String> = None;
    let mut page_no = 0u32;
    loop {
        page_no += 1;
        let page = source
            .check_runs_page(repo, sha, next.as_deref())
            .await
            .map_err(|source| ChecksError::Fetch {
                call: SignalCall::CheckRuns,
                source,
            })?;
        obs::emit_page_fetched(page_no, page.items.len(), page.next.is_some());
        check_runs.extend(page.items);
        match page.next {
            Some(token) => next = Some(token),
            None => break,
        }
    }

    let statuses = source
        .combined_status(repo, sha)
        .await
        .map_err(|source| ChecksError::Fetch {
            call: SignalCall::CombinedStatus,
            source,
        })?;

    Ok(SignalSnapshot {
        check_runs,
        statuses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportError;
    use crate::fakes::{check_run, commit_status, ScriptedSignalSource};

    fn repo() -> RepoRef {
        RepoRef::new("acme", "widgets")
    }

    #[tokio::test]
    async fn test_follows_pagination_until_no_next() {
        let source = ScriptedSignalSource::new();
        source.push_cycle_pages(
            vec![
                vec![check_run("a", "completed", Some("success"))],
                vec![check_run("b", "completed", Some("success"))],
                vec![check_run("c", "queued", None)],
            ],
            vec![commit_status("deploy", "pending")],
        );

        let snapshot = fetch_signals(&source, &repo(), "abc123").await.unwrap();
        let names: Vec<&str> = snapshot.check_runs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(snapshot.statuses.len(), 1);
        assert_eq!(
            source.page_requests(),
            vec![None, Some("page-2".to_string()), Some("page-3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_on_later_page_fails_whole_fetch() {
        let source = ScriptedSignalSource::new();
        source.push_cycle_pages(
            vec![
                vec![check_run("a", "completed", Some("success"))],
                vec![check_run("b", "completed", Some("success"))],
            ],
            vec![],
        );
        source.fail_check_runs_on_page(
            2,
            TransportError::Status {
                operation: "list check runs".to_string(),
                status: 500,
            },
        );

        let err = fetch_signals(&source, &repo(), "abc123").await.unwrap_err();
        assert!(matches!(
            err,
            ChecksError::Fetch {
                call: SignalCall::CheckRuns,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_status_failure_is_attributed() {
        let source = ScriptedSignalSource::new();
        source.push_cycle(vec![check_run("a", "completed", Some("success"))], vec![]);
        source.fail_combined_status(TransportError::Timeout {
            operation: "get combined status".to_string(),
        });

        let err = fetch_signals(&source, &repo(), "abc123").await.unwrap_err();
        assert!(matches!(
            err,
            ChecksError::Fetch {
                call: SignalCall::CombinedStatus,
                ..
            }
        ));
        assert!(err.to_string().starts_with("fetching commit status"));
    }
}
