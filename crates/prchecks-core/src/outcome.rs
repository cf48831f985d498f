//! Final verdict for a set of aggregate counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::AggregateCounts;

/// Exit code reported while checks are still pending. Mirrors the `gh` CLI.
pub const PENDING_EXIT_CODE: i32 = 8;

/// Three-valued outcome of a status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AllPassed,
    Failed,
    Pending,
}

impl Outcome {
    /// Process exit code for scripting: 0 passed, 1 failed, 8 pending.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::AllPassed => 0,
            Outcome::Failed => 1,
            Outcome::Pending => PENDING_EXIT_CODE,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AllPassed => write!(f, "all checks passed"),
            Outcome::Failed => write!(f, "some checks failed"),
            Outcome::Pending => write!(f, "checks still pending"),
        }
    }
}

/// Decide the outcome. A failure dominates any pending checks.
pub fn decide(counts: &AggregateCounts) -> Outcome {
    if counts.failed > 0 {
        Outcome::Failed
    } else if counts.pending > 0 {
        Outcome::Pending
    } else {
        Outcome::AllPassed
    }
}
