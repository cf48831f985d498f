//! Raw signals as delivered by the two upstream sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from the check-runs source. Names may repeat across re-runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCheckSignal {
    pub name: String,

    /// Lifecycle status (`queued`, `in_progress`, `completed`, ...).
    pub status: String,

    /// Only meaningful once `status` is `completed`.
    pub conclusion: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub description: String,
    pub link: String,
}

/// One entry from the combined commit-status source, keyed by `context`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawStatusSignal {
    pub context: String,
    pub state: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub link: String,
}
