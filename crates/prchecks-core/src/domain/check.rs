//! Unified checks and per-bucket counts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical outcome category shared by both signal kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Pass,
    Fail,
    Pending,
    Skipping,
    Cancel,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Pass => "pass",
            Bucket::Fail => "fail",
            Bucket::Pending => "pending",
            Bucket::Skipping => "skipping",
            Bucket::Cancel => "cancel",
        }
    }

    /// Report ordering: failures first, then pending, then everything else.
    pub fn sort_rank(self) -> u8 {
        match self {
            Bucket::Fail => 0,
            Bucket::Pending => 1,
            Bucket::Pass | Bucket::Skipping | Bucket::Cancel => 2,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which upstream source a [`UnifiedCheck`] came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    CheckRun,
    Status,
}

/// The canonical per-check entity produced by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCheck {
    pub name: String,

    /// Upper-cased raw state (e.g. `SUCCESS`, `IN_PROGRESS`).
    pub state: String,

    pub bucket: Bucket,
    pub kind: SignalKind,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub description: String,
    pub link: String,
}

/// Per-bucket tallies for one fetch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub passed: u32,
    pub failed: u32,
    pub pending: u32,
    pub skipping: u32,
    pub cancelled: u32,
}

impl AggregateCounts {
    /// Count one check in its bucket.
    pub fn record(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Pass => self.passed += 1,
            Bucket::Fail => self.failed += 1,
            Bucket::Pending => self.pending += 1,
            Bucket::Skipping => self.skipping += 1,
            Bucket::Cancel => self.cancelled += 1,
        }
    }

    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Pass => self.passed,
            Bucket::Fail => self.failed,
            Bucket::Pending => self.pending,
            Bucket::Skipping => self.skipping,
            Bucket::Cancel => self.cancelled,
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.pending + self.skipping + self.cancelled
    }
}
