//! Domain types shared by every stage of the status pipeline.

pub mod check;
pub mod error;
pub mod pull_request;
pub mod signal;

pub use check::{AggregateCounts, Bucket, SignalKind, UnifiedCheck};
pub use error::{ChecksError, ErrorKind, Result, SignalCall, TransportError};
pub use pull_request::{PullRequestRef, RepoRef};
pub use signal::{RawCheckSignal, RawStatusSignal};
