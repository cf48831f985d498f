//! End-to-end convergence tests over the in-memory fakes.
//!
//! Each test resolves a selector, runs the loop, and checks the final
//! report the way the CLI consumes it.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use prchecks_core::fakes::{
    check_run, commit_status, MemoryPullRequestSource, RecordingSleeper, ScriptedSignalSource,
};
use prchecks_core::{
    resolve_pull_request, sort_checks, Bucket, ChecksError, ConvergenceLoop, Outcome,
    PullRequestRef, PullRequestSelector, RawCheckSignal, RepoRef, StopReason, WatchOptions,
};

fn repo() -> RepoRef {
    RepoRef::new("acme", "widgets")
}

fn timed_run(name: &str, conclusion: &str, started_minute: u32) -> RawCheckSignal {
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, 10, started_minute, 0)
        .unwrap();
    RawCheckSignal {
        started_at: Some(start),
        completed_at: Some(start + chrono::Duration::seconds(90)),
        ..check_run(name, "completed", Some(conclusion))
    }
}

async fn resolve(selector: &str) -> PullRequestRef {
    let prs = MemoryPullRequestSource::new();
    prs.insert(PullRequestRef::new(42, "abc1234def", "feature/login"));
    let selector = PullRequestSelector::parse(selector).unwrap();
    resolve_pull_request(&prs, &repo(), &selector, || {
        Err(ChecksError::NoBranchDetected("detached".to_string()))
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn url_selector_then_single_pass() {
    let pr = resolve("https://github.com/acme/widgets/pull/42/files").await;
    assert_eq!(pr.head_sha, "abc1234def");

    let signals = ScriptedSignalSource::new();
    signals.push_cycle(
        vec![
            check_run("build", "completed", Some("SUCCESS")),
            check_run("docs", "completed", Some("skipped")),
        ],
        vec![commit_status("ci/deploy", "pending")],
    );
    let sleeper = RecordingSleeper::new();

    let watch = ConvergenceLoop::new(&signals, &sleeper, WatchOptions::single_pass()).unwrap();
    let report = watch.run(&repo(), &pr, |_| {}).await.unwrap();

    assert_eq!(report.cycles, 1);
    assert_eq!(report.stop_reason, StopReason::SinglePass);
    assert_eq!(report.outcome, Outcome::Pending);
    assert_eq!(report.outcome.exit_code(), 8);
    assert!(sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn rerun_replaces_earlier_failure() {
    let pr = resolve("#42").await;

    let signals = ScriptedSignalSource::new();
    signals.push_cycle(
        vec![timed_run("build", "failure", 1), timed_run("build", "success", 9)],
        vec![],
    );
    let sleeper = RecordingSleeper::new();

    let watch = ConvergenceLoop::new(&signals, &sleeper, WatchOptions::single_pass()).unwrap();
    let report = watch.run(&repo(), &pr, |_| {}).await.unwrap();

    assert_eq!(report.aggregate.checks.len(), 1);
    assert_eq!(report.aggregate.checks[0].bucket, Bucket::Pass);
    assert_eq!(report.outcome, Outcome::AllPassed);
}

#[tokio::test]
async fn polling_waits_for_every_pending_check() {
    let pr = resolve("42").await;

    let signals = ScriptedSignalSource::new();
    signals.push_cycle(
        vec![check_run("build", "queued", None)],
        vec![commit_status("ci/deploy", "pending")],
    );
    signals.push_cycle(
        vec![check_run("build", "completed", Some("success"))],
        vec![commit_status("ci/deploy", "pending")],
    );
    signals.push_cycle(
        vec![check_run("build", "completed", Some("success"))],
        vec![commit_status("ci/deploy", "error")],
    );
    let sleeper = RecordingSleeper::new();

    let options = WatchOptions::polling(Duration::from_secs(10));
    let watch = ConvergenceLoop::new(&signals, &sleeper, options).unwrap();

    let mut pending_per_cycle = Vec::new();
    let report = watch
        .run(&repo(), &pr, |snap| pending_per_cycle.push(snap.aggregate.counts.pending))
        .await
        .unwrap();

    assert_eq!(pending_per_cycle, vec![2, 1, 0]);
    assert_eq!(report.cycles, 3);
    assert_eq!(report.stop_reason, StopReason::Converged);
    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(sleeper.elapsed(), Duration::from_secs(20));

    let mut checks = report.aggregate.checks.clone();
    sort_checks(&mut checks);
    assert_eq!(checks[0].name, "ci/deploy");
    assert_eq!(checks[0].bucket, Bucket::Fail);
}

#[tokio::test]
async fn fail_fast_stops_with_pending_checks_left() {
    let pr = resolve("42").await;

    let signals = ScriptedSignalSource::new();
    signals.push_cycle(
        vec![
            check_run("build", "completed", Some("failure")),
            check_run("test-1", "in_progress", None),
            check_run("test-2", "in_progress", None),
            check_run("test-3", "queued", None),
        ],
        vec![],
    );
    let sleeper = RecordingSleeper::new();

    let options = WatchOptions::polling(Duration::from_secs(10)).with_fail_fast(true);
    let watch = ConvergenceLoop::new(&signals, &sleeper, options).unwrap();
    let report = watch.run(&repo(), &pr, |_| {}).await.unwrap();

    assert_eq!(report.cycles, 1);
    assert_eq!(report.stop_reason, StopReason::FailFast);
    assert_eq!(report.aggregate.counts.pending, 3);
    assert_eq!(report.outcome.exit_code(), 1);
    assert_eq!(signals.cycles_started(), 1);
}

#[tokio::test]
async fn empty_commit_passes() {
    let pr = resolve("42").await;

    let signals = ScriptedSignalSource::new();
    signals.push_cycle(vec![], vec![]);
    let sleeper = RecordingSleeper::new();

    let options = WatchOptions::polling(Duration::from_secs(10));
    let watch = ConvergenceLoop::new(&signals, &sleeper, options).unwrap();
    let report = watch.run(&repo(), &pr, |_| {}).await.unwrap();

    assert_eq!(report.aggregate.counts.total(), 0);
    assert_eq!(report.outcome, Outcome::AllPassed);
    assert_eq!(report.stop_reason, StopReason::Converged);
}
