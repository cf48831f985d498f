//! In-memory fakes for the source and sleeper traits (testing only)
//!
//! Provides `MemoryPullRequestSource`, `ScriptedSignalSource`, and
//! `RecordingSleeper` that satisfy the trait contracts without network
//! access or real delays.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{PullRequestRef, RawCheckSignal, RawStatusSignal, RepoRef, TransportError};
use crate::source::{Page, PullRequestSource, SignalSource};
use crate::watch::Sleeper;

// ---------------------------------------------------------------------------
// Signal builders
// ---------------------------------------------------------------------------

/// A check-run with no timestamps.
pub fn check_run(name: &str, status: &str, conclusion: Option<&str>) -> RawCheckSignal {
    RawCheckSignal {
        name: name.to_string(),
        status: status.to_string(),
        conclusion: conclusion.map(str::to_string),
        started_at: None,
        completed_at: None,
        description: String::new(),
        link: format!("https://ci.example.com/runs/{name}"),
    }
}

/// A commit status with no timestamps.
pub fn commit_status(context: &str, state: &str) -> RawStatusSignal {
    RawStatusSignal {
        context: context.to_string(),
        state: state.to_string(),
        description: String::new(),
        created_at: None,
        updated_at: None,
        link: format!("https://ci.example.com/status/{context}"),
    }
}

// ---------------------------------------------------------------------------
// MemoryPullRequestSource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PullRequestState {
    by_number: HashMap<u64, PullRequestRef>,
    by_branch: HashMap<String, Vec<PullRequestRef>>,
    failure: Option<TransportError>,
    number_lookups: Vec<u64>,
    branch_lookups: Vec<String>,
}

/// In-memory pull request lookup.
#[derive(Debug, Default)]
pub struct MemoryPullRequestSource {
    state: Mutex<PullRequestState>,
}

impl MemoryPullRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open pull request, reachable by number and head branch.
    pub fn insert(&self, pr: PullRequestRef) {
        let mut state = self.state.lock().unwrap();
        state
            .by_branch
            .entry(pr.head_branch.clone())
            .or_default()
            .push(pr.clone());
        state.by_number.insert(pr.number, pr);
    }

    /// Make the next lookup fail with `err`.
    pub fn fail_next(&self, err: TransportError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    pub fn number_lookups(&self) -> Vec<u64> {
        self.state.lock().unwrap().number_lookups.clone()
    }

    pub fn branch_lookups(&self) -> Vec<String> {
        self.state.lock().unwrap().branch_lookups.clone()
    }
}

#[async_trait]
impl PullRequestSource for MemoryPullRequestSource {
    async fn pull_request(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<Option<PullRequestRef>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.number_lookups.push(number);
        if let Some(err) = state.failure.take() {
            return Err(err);
        }
        Ok(state.by_number.get(&number).cloned())
    }

    async fn open_pull_requests_for_branch(
        &self,
        _repo: &RepoRef,
        branch: &str,
    ) -> Result<Vec<PullRequestRef>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.branch_lookups.push(branch.to_string());
        if let Some(err) = state.failure.take() {
            return Err(err);
        }
        Ok(state.by_branch.get(branch).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// ScriptedSignalSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct ScriptedCycle {
    pages: Vec<Vec<RawCheckSignal>>,
    statuses: Vec<RawStatusSignal>,
}

#[derive(Debug, Default)]
struct SignalState {
    cycles: VecDeque<ScriptedCycle>,
    current: ScriptedCycle,
    page_requests: Vec<Option<String>>,
    check_runs_failure: Option<(usize, TransportError)>,
    status_failure: Option<(Option<u32>, TransportError)>,
    cycles_started: u32,
}

/// Signal source replaying a script of fetch cycles.
///
/// Each first-page request starts the next scripted cycle; once the script
/// is down to its last cycle that cycle is replayed indefinitely. Pages are
/// chained with `page-N` continuation tokens.
#[derive(Debug, Default)]
pub struct ScriptedSignalSource {
    state: Mutex<SignalState>,
}

impl ScriptedSignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a cycle whose check-runs fit on one page.
    pub fn push_cycle(&self, check_runs: Vec<RawCheckSignal>, statuses: Vec<RawStatusSignal>) {
        self.push_cycle_pages(vec![check_runs], statuses);
    }

    /// Script a cycle whose check-runs span several pages.
    pub fn push_cycle_pages(
        &self,
        pages: Vec<Vec<RawCheckSignal>>,
        statuses: Vec<RawStatusSignal>,
    ) {
        self.state
            .lock()
            .unwrap()
            .cycles
            .push_back(ScriptedCycle { pages, statuses });
    }

    /// Fail the next request for check-run page `page` (1-based).
    pub fn fail_check_runs_on_page(&self, page: usize, err: TransportError) {
        self.state.lock().unwrap().check_runs_failure = Some((page, err));
    }

    /// Fail the next combined status request.
    pub fn fail_combined_status(&self, err: TransportError) {
        self.state.lock().unwrap().status_failure = Some((None, err));
    }

    /// Fail the combined status request of fetch cycle `cycle` (1-based).
    pub fn fail_combined_status_on_cycle(&self, cycle: u32, err: TransportError) {
        self.state.lock().unwrap().status_failure = Some((Some(cycle), err));
    }

    /// Continuation tokens seen by `check_runs_page`, in call order.
    pub fn page_requests(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().page_requests.clone()
    }

    /// Number of fetch cycles started (first-page requests).
    pub fn cycles_started(&self) -> u32 {
        self.state.lock().unwrap().cycles_started
    }
}

fn page_index(token: Option<&str>) -> usize {
    token
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse::<usize>().ok())
        .map(|n| n.saturating_sub(1))
        .unwrap_or(0)
}

#[async_trait]
impl SignalSource for ScriptedSignalSource {
    async fn check_runs_page(
        &self,
        _repo: &RepoRef,
        _sha: &str,
        page: Option<&str>,
    ) -> Result<Page<RawCheckSignal>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.page_requests.push(page.map(str::to_string));

        if page.is_none() {
            state.cycles_started += 1;
            state.current = if state.cycles.len() > 1 {
                state.cycles.pop_front().unwrap_or_default()
            } else {
                state.cycles.front().cloned().unwrap_or_default()
            };
        }

        let index = page_index(page);
        if matches!(&state.check_runs_failure, Some((n, _)) if *n == index + 1) {
            if let Some((_, err)) = state.check_runs_failure.take() {
                return Err(err);
            }
        }

        let pages = &state.current.pages;
        let items = pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < pages.len()).then(|| format!("page-{}", index + 2));
        Ok(Page { items, next })
    }

    async fn combined_status(
        &self,
        _repo: &RepoRef,
        _sha: &str,
    ) -> Result<Vec<RawStatusSignal>, TransportError> {
        let mut state = self.state.lock().unwrap();
        let cycle = state.cycles_started;
        if matches!(&state.status_failure, Some((target, _)) if target.map_or(true, |c| c == cycle))
        {
            if let Some((_, err)) = state.status_failure.take() {
                return Err(err);
            }
        }
        Ok(state.current.statuses.clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingSleeper
// ---------------------------------------------------------------------------

/// Sleeper that returns immediately and records each requested delay.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Total logical time spent waiting.
    pub fn elapsed(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
