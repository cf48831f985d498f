//! prchecks Core Library
//!
//! Resolves a pull request selector to a head commit, fetches the two
//! upstream signal collections (check-runs and commit statuses), folds them
//! into one bucketed status model, and polls until the status converges.
//!
//! The HTTP transport lives behind the [`PullRequestSource`] and
//! [`SignalSource`] traits; `prchecks-github` provides the production
//! implementation and [`fakes`] provides in-memory ones for tests.

pub mod aggregate;
pub mod domain;
pub mod fakes;
pub mod fetch;
pub mod git;
pub mod obs;
pub mod outcome;
pub mod selector;
pub mod source;
pub mod telemetry;
pub mod watch;

pub use aggregate::{aggregate, classify_check_run, classify_status, sort_checks, Aggregate};
pub use domain::{
    AggregateCounts, Bucket, ChecksError, ErrorKind, PullRequestRef, RawCheckSignal,
    RawStatusSignal, RepoRef, Result, SignalCall, SignalKind, TransportError, UnifiedCheck,
};
pub use fetch::{fetch_signals, SignalSnapshot};
pub use git::{current_branch, detect_repo, parse_git_remote};
pub use outcome::{decide, Outcome};
pub use selector::{resolve_pull_request, PullRequestSelector};
pub use source::{Page, PullRequestSource, SignalSource};
pub use telemetry::init_tracing;
pub use watch::{
    evaluate, ConvergenceLoop, CycleSnapshot, Sleeper, StopReason, TokioSleeper, Transition,
    WatchOptions, WatchReport, WatchState,
};
