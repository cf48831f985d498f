//! Structured observability hooks for pull request check lifecycles.
//!
//! This module provides:
//! - A watch-scoped tracing span for the convergence loop
//! - Emission functions for resolution, pagination, and polling events
//!
//! Events go through `tracing`; verbosity is controlled by `RUST_LOG`
//! or the CLI's `--verbose` flag.

use std::time::Duration;

use tracing::{debug, info, info_span, Span};

use crate::domain::{AggregateCounts, PullRequestRef};
use crate::outcome::Outcome;
use crate::watch::StopReason;

/// Span covering one convergence loop, tagged with the pull request number.
///
/// Attach it to the loop future with `tracing::Instrument` so it is only
/// entered while the future is polled.
///
/// # Example
///
/// ```ignore
/// loop_future.instrument(watch_span(42)).await
/// // Every event inside carries pr = 42
/// ```
pub fn watch_span(pr_number: u64) -> Span {
    info_span!("prchecks.watch", pr = pr_number)
}

/// Emit event: a selector resolved to a pull request.
pub fn emit_pr_resolved(selector: &str, pr: &PullRequestRef) {
    info!(
        event = "pr.resolved",
        selector = %selector,
        pr = pr.number,
        head_sha = %pr.short_sha(),
        head_branch = %pr.head_branch,
    );
}

/// Emit event: one page of check-runs arrived.
pub fn emit_page_fetched(page: u32, items: usize, has_next: bool) {
    debug!(
        event = "signals.page_fetched",
        page = page,
        items = items,
        has_next = has_next,
    );
}

/// Emit event: a fetch cycle was aggregated.
pub fn emit_cycle_completed(cycle: u32, counts: &AggregateCounts) {
    info!(
        event = "watch.cycle_completed",
        cycle = cycle,
        passed = counts.passed,
        failed = counts.failed,
        pending = counts.pending,
        skipping = counts.skipping,
        cancelled = counts.cancelled,
    );
}

pub fn emit_waiting(cycle: u32, interval: Duration) {
    debug!(
        event = "watch.waiting",
        cycle = cycle,
        interval_ms = interval.as_millis() as u64,
    );
}

/// Emit event: the loop reached its final state.
pub fn emit_watch_finished(cycles: u32, reason: StopReason, outcome: Outcome) {
    info!(
        event = "watch.finished",
        cycles = cycles,
        stop_reason = ?reason,
        outcome = ?outcome,
        exit_code = outcome.exit_code(),
    );
}
