//! Folding check-runs and commit statuses into one bucketed list.
//!
//! Rules:
//! - Check-runs are keyed by name. They are ordered by start time descending
//!   before deduplication so the newest attempt of a re-run check wins.
//! - Statuses are keyed by context and keep the first occurrence in upstream
//!   order; the combined-status endpoint already reports the latest state.
//! - Classification is a case-insensitive table lookup per source. Anything
//!   not in the table is `pending`.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AggregateCounts, Bucket, RawCheckSignal, RawStatusSignal, SignalKind, UnifiedCheck,
};

/// Check-run conclusion (or lifecycle status) to bucket.
const CHECK_RUN_BUCKETS: &[(&str, Bucket)] = &[
    ("success", Bucket::Pass),
    ("skipped", Bucket::Skipping),
    ("neutral", Bucket::Skipping),
    ("failure", Bucket::Fail),
    ("error", Bucket::Fail),
    ("timed_out", Bucket::Fail),
    ("action_required", Bucket::Fail),
    ("cancelled", Bucket::Cancel),
];

/// Commit status state to bucket.
const STATUS_BUCKETS: &[(&str, Bucket)] = &[
    ("success", Bucket::Pass),
    ("failure", Bucket::Fail),
    ("error", Bucket::Fail),
];

fn lookup(table: &[(&str, Bucket)], state: &str) -> Bucket {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(state))
        .map(|(_, bucket)| *bucket)
        .unwrap_or(Bucket::Pending)
}

/// The state a check-run is classified by: its conclusion once completed,
/// otherwise its lifecycle status.
fn effective_state(run: &RawCheckSignal) -> &str {
    if run.status.eq_ignore_ascii_case("completed") {
        run.conclusion.as_deref().unwrap_or("")
    } else {
        &run.status
    }
}

/// Bucket for a single check-run.
pub fn classify_check_run(run: &RawCheckSignal) -> Bucket {
    lookup(CHECK_RUN_BUCKETS, effective_state(run))
}

/// Bucket for a single commit status.
pub fn classify_status(status: &RawStatusSignal) -> Bucket {
    lookup(STATUS_BUCKETS, &status.state)
}

fn unify_check_run(run: &RawCheckSignal) -> UnifiedCheck {
    UnifiedCheck {
        name: run.name.clone(),
        state: effective_state(run).to_uppercase(),
        bucket: classify_check_run(run),
        kind: SignalKind::CheckRun,
        started_at: run.started_at,
        completed_at: run.completed_at,
        description: run.description.clone(),
        link: run.link.clone(),
    }
}

fn unify_status(status: &RawStatusSignal) -> UnifiedCheck {
    UnifiedCheck {
        name: status.context.clone(),
        state: status.state.to_uppercase(),
        bucket: classify_status(status),
        kind: SignalKind::Status,
        started_at: status.created_at,
        completed_at: status.updated_at,
        description: status.description.clone(),
        link: status.link.clone(),
    }
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Check-runs first (newest-first order), then statuses (upstream order).
    pub checks: Vec<UnifiedCheck>,
    pub counts: AggregateCounts,
}

/// Deduplicate, classify and count both signal collections.
pub fn aggregate(check_runs: &[RawCheckSignal], statuses: &[RawStatusSignal]) -> Aggregate {
    let mut runs: Vec<&RawCheckSignal> = check_runs.iter().collect();
    // Stable; runs without a start time sort last.
    runs.sort_by_key(|run| Reverse(run.started_at));

    let mut checks = Vec::with_capacity(runs.len() + statuses.len());
    let mut counts = AggregateCounts::default();

    let mut seen_runs = HashSet::new();
    for run in runs {
        if !seen_runs.insert(run.name.as_str()) {
            continue;
        }
        let check = unify_check_run(run);
        counts.record(check.bucket);
        checks.push(check);
    }

    let mut seen_contexts = HashSet::new();
    for status in statuses {
        if !seen_contexts.insert(status.context.as_str()) {
            continue;
        }
        let check = unify_status(status);
        counts.record(check.bucket);
        checks.push(check);
    }

    Aggregate { checks, counts }
}

/// Sort for display: fail, then pending, then the rest; ties by name, then link.
pub fn sort_checks(checks: &mut [UnifiedCheck]) {
    checks.sort_by(|a, b| {
        a.bucket
            .sort_rank()
            .cmp(&b.bucket.sort_rank())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.link.cmp(&b.link))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(name: &str, status: &str, conclusion: Option<&str>, started_min: u32) -> RawCheckSignal {
        RawCheckSignal {
            name: name.to_string(),
            status: status.to_string(),
            conclusion: conclusion.map(str::to_string),
            started_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, started_min, 0).unwrap()),
            completed_at: None,
            description: String::new(),
            link: format!("https://ci.example.com/{name}/{started_min}"),
        }
    }

    fn status(context: &str, state: &str) -> RawStatusSignal {
        RawStatusSignal {
            context: context.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    fn unified(name: &str, bucket: Bucket, link: &str) -> UnifiedCheck {
        UnifiedCheck {
            name: name.to_string(),
            state: String::new(),
            bucket,
            kind: SignalKind::CheckRun,
            started_at: None,
            completed_at: None,
            description: String::new(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_check_run_classification_is_case_insensitive() {
        assert_eq!(
            classify_check_run(&run("a", "completed", Some("SUCCESS"), 0)),
            Bucket::Pass
        );
        assert_eq!(
            classify_check_run(&run("a", "COMPLETED", Some("Failure"), 0)),
            Bucket::Fail
        );
        assert_eq!(
            classify_check_run(&run("a", "in_progress", None, 0)),
            Bucket::Pending
        );
    }

    #[test]
    fn test_check_run_table() {
        let cases = [
            ("success", Bucket::Pass),
            ("skipped", Bucket::Skipping),
            ("neutral", Bucket::Skipping),
            ("failure", Bucket::Fail),
            ("error", Bucket::Fail),
            ("timed_out", Bucket::Fail),
            ("action_required", Bucket::Fail),
            ("cancelled", Bucket::Cancel),
            ("stale", Bucket::Pending),
            ("something_new", Bucket::Pending),
        ];
        for (conclusion, expected) in cases {
            assert_eq!(
                classify_check_run(&run("a", "completed", Some(conclusion), 0)),
                expected,
                "conclusion {conclusion}"
            );
        }
    }

    #[test]
    fn test_incomplete_run_ignores_conclusion() {
        // Classified by lifecycle status until completed.
        assert_eq!(
            classify_check_run(&run("a", "queued", Some("success"), 0)),
            Bucket::Pending
        );
        // Completed without a conclusion has nothing to classify by.
        assert_eq!(
            classify_check_run(&run("a", "completed", None, 0)),
            Bucket::Pending
        );
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(&status("ci", "pending")), Bucket::Pending);
        assert_eq!(classify_status(&status("ci", "error")), Bucket::Fail);
        assert_eq!(classify_status(&status("ci", "FAILURE")), Bucket::Fail);
        assert_eq!(classify_status(&status("ci", "Success")), Bucket::Pass);
        assert_eq!(classify_status(&status("ci", "skipped")), Bucket::Pending);
    }

    #[test]
    fn test_newest_check_run_wins() {
        let runs = vec![
            run("build", "completed", Some("failure"), 1),
            run("build", "completed", Some("success"), 5),
        ];
        let agg = aggregate(&runs, &[]);
        assert_eq!(agg.checks.len(), 1);
        assert_eq!(agg.checks[0].name, "build");
        assert_eq!(agg.checks[0].bucket, Bucket::Pass);
        assert_eq!(agg.checks[0].state, "SUCCESS");
        assert_eq!(agg.counts.passed, 1);
        assert_eq!(agg.counts.failed, 0);
    }

    #[test]
    fn test_run_without_start_time_loses_to_started_run() {
        let mut unstarted = run("lint", "queued", None, 0);
        unstarted.started_at = None;
        let runs = vec![unstarted, run("lint", "completed", Some("success"), 0)];
        let agg = aggregate(&runs, &[]);
        assert_eq!(agg.checks.len(), 1);
        assert_eq!(agg.checks[0].bucket, Bucket::Pass);
    }

    #[test]
    fn test_status_first_occurrence_wins() {
        let statuses = vec![status("deploy", "success"), status("deploy", "failure")];
        let agg = aggregate(&[], &statuses);
        assert_eq!(agg.checks.len(), 1);
        assert_eq!(agg.checks[0].bucket, Bucket::Pass);
        assert_eq!(agg.checks[0].kind, SignalKind::Status);
    }

    #[test]
    fn test_same_name_across_sources_is_kept_twice() {
        let agg = aggregate(
            &[run("ci", "completed", Some("success"), 0)],
            &[status("ci", "pending")],
        );
        assert_eq!(agg.checks.len(), 2);
        assert_eq!(agg.counts.passed, 1);
        assert_eq!(agg.counts.pending, 1);
    }

    #[test]
    fn test_counts_sum_matches_list() {
        let runs = vec![
            run("a", "completed", Some("success"), 0),
            run("b", "completed", Some("skipped"), 1),
            run("c", "completed", Some("cancelled"), 2),
            run("a", "completed", Some("failure"), 3),
            run("d", "waiting", None, 4),
        ];
        let statuses = vec![
            status("x", "error"),
            status("y", "pending"),
            status("x", "success"),
        ];
        let agg = aggregate(&runs, &statuses);
        assert_eq!(agg.counts.total() as usize, agg.checks.len());
        assert_eq!(agg.checks.len(), 6);
        assert_eq!(agg.counts.failed, 2);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let runs = vec![
            run("build", "completed", Some("failure"), 1),
            run("build", "completed", Some("success"), 2),
            run("test", "in_progress", None, 3),
        ];
        let statuses = vec![status("deploy", "pending")];
        assert_eq!(aggregate(&runs, &statuses), aggregate(&runs, &statuses));
    }

    #[test]
    fn test_sort_orders_by_bucket_then_name() {
        let mut checks = vec![
            unified("alpha", Bucket::Pass, ""),
            unified("beta", Bucket::Fail, ""),
            unified("gamma", Bucket::Pending, ""),
        ];
        sort_checks(&mut checks);
        let buckets: Vec<Bucket> = checks.iter().map(|c| c.bucket).collect();
        assert_eq!(buckets, vec![Bucket::Fail, Bucket::Pending, Bucket::Pass]);

        let mut checks = vec![
            unified("zeta", Bucket::Pass, ""),
            unified("eta", Bucket::Skipping, ""),
            unified("alpha", Bucket::Cancel, ""),
            unified("mu", Bucket::Fail, "b"),
            unified("mu", Bucket::Fail, "a"),
        ];
        sort_checks(&mut checks);
        let order: Vec<(&str, &str)> = checks
            .iter()
            .map(|c| (c.name.as_str(), c.link.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("mu", "a"), ("mu", "b"), ("alpha", ""), ("eta", ""), ("zeta", "")]
        );
    }
}
