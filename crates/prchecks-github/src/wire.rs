//! REST response payloads and their conversion into core signals.
//!
//! Only the fields prchecks reads are modelled. GitHub sends `null` for
//! many of them before a run finishes, so most are optional.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use prchecks_core::{PullRequestRef, RawCheckSignal, RawStatusSignal};

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub head: HeadPayload,
}

#[derive(Debug, Deserialize)]
pub struct HeadPayload {
    pub sha: String,
    #[serde(rename = "ref")]
    pub branch: String,
}

impl From<PullRequestPayload> for PullRequestRef {
    fn from(pr: PullRequestPayload) -> Self {
        PullRequestRef::new(pr.number, pr.head.sha, pr.head.branch)
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckRunsPayload {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub check_runs: Vec<CheckRunPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRunPayload {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub output: Option<CheckRunOutput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckRunOutput {
    #[serde(default)]
    pub title: Option<String>,
}

impl From<CheckRunPayload> for RawCheckSignal {
    fn from(run: CheckRunPayload) -> Self {
        RawCheckSignal {
            name: run.name,
            status: run.status,
            conclusion: run.conclusion.filter(|c| !c.is_empty()),
            started_at: run.started_at,
            completed_at: run.completed_at,
            description: run.output.and_then(|o| o.title).unwrap_or_default(),
            link: run.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CombinedStatusPayload {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub statuses: Vec<CommitStatusPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CommitStatusPayload {
    pub context: String,
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CommitStatusPayload> for RawStatusSignal {
    fn from(status: CommitStatusPayload) -> Self {
        RawStatusSignal {
            context: status.context,
            state: status.state,
            description: status.description.unwrap_or_default(),
            created_at: status.created_at,
            updated_at: status.updated_at,
            link: status.target_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_run_with_nulls() {
        let payload: CheckRunPayload = serde_json::from_value(json!({
            "name": "build",
            "status": "in_progress",
            "conclusion": null,
            "started_at": "2024-05-01T10:00:00Z",
            "completed_at": null,
            "html_url": "https://github.com/acme/widgets/runs/1",
            "output": { "title": null, "summary": null },
            "check_suite": { "app": { "slug": "github-actions" } }
        }))
        .unwrap();

        let signal = RawCheckSignal::from(payload);
        assert_eq!(signal.name, "build");
        assert_eq!(signal.conclusion, None);
        assert!(signal.started_at.is_some());
        assert_eq!(signal.completed_at, None);
        assert_eq!(signal.description, "");
        assert_eq!(signal.link, "https://github.com/acme/widgets/runs/1");
    }

    #[test]
    fn test_check_run_output_title_is_description() {
        let payload: CheckRunPayload = serde_json::from_value(json!({
            "name": "lint",
            "status": "completed",
            "conclusion": "failure",
            "output": { "title": "3 warnings" }
        }))
        .unwrap();
        let signal = RawCheckSignal::from(payload);
        assert_eq!(signal.conclusion.as_deref(), Some("failure"));
        assert_eq!(signal.description, "3 warnings");
    }

    #[test]
    fn test_commit_status_conversion() {
        let payload: CombinedStatusPayload = serde_json::from_value(json!({
            "state": "pending",
            "statuses": [{
                "context": "ci/deploy",
                "state": "pending",
                "description": null,
                "target_url": "https://ci.example.com/1",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:05:00Z"
            }]
        }))
        .unwrap();
        let statuses: Vec<RawStatusSignal> =
            payload.statuses.into_iter().map(Into::into).collect();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].context, "ci/deploy");
        assert_eq!(statuses[0].description, "");
        assert_eq!(statuses[0].link, "https://ci.example.com/1");
    }

    #[test]
    fn test_pull_request_conversion() {
        let payload: PullRequestPayload = serde_json::from_value(json!({
            "number": 42,
            "state": "open",
            "head": { "sha": "abc123", "ref": "feature/login" }
        }))
        .unwrap();
        let pr = PullRequestRef::from(payload);
        assert_eq!(pr, PullRequestRef::new(42, "abc123", "feature/login"));
    }
}
