//! Convergence loop: fetch, evaluate, wait, repeat.
//!
//! ```text
//! Fetching -> Evaluating -> Waiting -> Fetching ...
//!                        \-> Done
//! ```
//!
//! The first cycle always runs. Without polling the loop is a single pass.
//! With polling it stops once nothing is pending, or early when fail-fast is
//! set and a failure is visible. Each cycle's aggregate replaces the previous
//! one only after both fetches succeed; any fetch error ends the loop.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::aggregate::{aggregate, Aggregate};
use crate::domain::{AggregateCounts, ChecksError, PullRequestRef, RepoRef, Result};
use crate::fetch::fetch_signals;
use crate::obs;
use crate::outcome::{decide, Outcome};
use crate::source::SignalSource;

/// Default delay between polling cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Suspends the loop between cycles.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub watch: bool,
    pub fail_fast: bool,
    pub interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            watch: false,
            fail_fast: false,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl WatchOptions {
    /// One fetch cycle, no polling.
    pub fn single_pass() -> Self {
        Self::default()
    }

    /// Poll every `interval` until nothing is pending.
    pub fn polling(interval: Duration) -> Self {
        Self {
            watch: true,
            fail_fast: false,
            interval,
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Reject combinations that make no sense before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.fail_fast && !self.watch {
            return Err(ChecksError::Configuration(
                "--fail-fast requires --watch".to_string(),
            ));
        }
        if self.watch && self.interval.is_zero() {
            return Err(ChecksError::Configuration(
                "--interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Fetching,
    Evaluating,
    Waiting,
    Done,
}

/// Why the loop reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Polling was not requested.
    SinglePass,
    /// No checks are pending.
    Converged,
    /// A failure was seen with fail-fast set.
    FailFast,
}

/// Result of evaluating one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Wait,
    Done(StopReason),
}

/// Decide what follows a cycle with the given counts.
pub fn evaluate(options: &WatchOptions, counts: &AggregateCounts) -> Transition {
    if !options.watch {
        return Transition::Done(StopReason::SinglePass);
    }
    if counts.pending == 0 {
        return Transition::Done(StopReason::Converged);
    }
    if options.fail_fast && counts.failed > 0 {
        return Transition::Done(StopReason::FailFast);
    }
    Transition::Wait
}

/// What an observer sees after each completed cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleSnapshot<'a> {
    pub cycle: u32,
    pub aggregate: &'a Aggregate,
    pub next: Transition,
}

impl CycleSnapshot<'_> {
    /// Whether this is the last cycle of the loop.
    pub fn is_final(&self) -> bool {
        matches!(self.next, Transition::Done(_))
    }
}

/// Final state of a completed loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchReport {
    pub pull_request: PullRequestRef,
    pub aggregate: Aggregate,
    pub cycles: u32,
    pub stop_reason: StopReason,
    pub outcome: Outcome,
}

/// The polling loop over a signal source.
pub struct ConvergenceLoop<'a, S: ?Sized, Z: ?Sized> {
    source: &'a S,
    sleeper: &'a Z,
    options: WatchOptions,
}

impl<'a, S, Z> ConvergenceLoop<'a, S, Z>
where
    S: SignalSource + ?Sized,
    Z: Sleeper + ?Sized,
{
    /// Build a loop, rejecting invalid options up front.
    pub fn new(source: &'a S, sleeper: &'a Z, options: WatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            source,
            sleeper,
            options,
        })
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Run until `Done`, calling `on_cycle` after every evaluated cycle.
    pub async fn run<F>(
        &self,
        repo: &RepoRef,
        pr: &PullRequestRef,
        on_cycle: F,
    ) -> Result<WatchReport>
    where
        F: FnMut(&CycleSnapshot<'_>),
    {
        self.drive(repo, pr, on_cycle)
            .instrument(obs::watch_span(pr.number))
            .await
    }

    async fn drive<F>(
        &self,
        repo: &RepoRef,
        pr: &PullRequestRef,
        mut on_cycle: F,
    ) -> Result<WatchReport>
    where
        F: FnMut(&CycleSnapshot<'_>),
    {
        let mut state = WatchState::Fetching;
        let mut cycle = 0u32;
        let mut latest = Aggregate::default();
        let mut stop_reason = StopReason::SinglePass;

        loop {
            state = match state {
                WatchState::Fetching => {
                    cycle += 1;
                    let snapshot = fetch_signals(self.source, repo, &pr.head_sha).await?;
                    latest = aggregate(&snapshot.check_runs, &snapshot.statuses);
                    WatchState::Evaluating
                }
                WatchState::Evaluating => {
                    let next = evaluate(&self.options, &latest.counts);
                    obs::emit_cycle_completed(cycle, &latest.counts);
                    on_cycle(&CycleSnapshot {
                        cycle,
                        aggregate: &latest,
                        next,
                    });
                    match next {
                        Transition::Wait => WatchState::Waiting,
                        Transition::Done(reason) => {
                            stop_reason = reason;
                            WatchState::Done
                        }
                    }
                }
                WatchState::Waiting => {
                    obs::emit_waiting(cycle, self.options.interval);
                    self.sleeper.sleep(self.options.interval).await;
                    WatchState::Fetching
                }
                WatchState::Done => break,
            };
        }

        let outcome = decide(&latest.counts);
        obs::emit_watch_finished(cycle, stop_reason, outcome);

        Ok(WatchReport {
            pull_request: pr.clone(),
            aggregate: latest,
            cycles: cycle,
            stop_reason,
            outcome,
        })
    }
}
