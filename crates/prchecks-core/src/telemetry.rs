//! Tracing initialisation for the `prchecks` binary.
//!
//! stdout carries the check table or JSON report and is often piped into
//! other tools, so every log line goes to stderr. The CLI runs quiet by
//! default (WARN) and `-v` lowers the floor to DEBUG, which surfaces the
//! per-page and per-wait events from [`crate::obs`]. `RUST_LOG` overrides
//! both, e.g. `RUST_LOG=prchecks_github=debug`.
//!
//! Only the first call installs a subscriber; later calls are ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json` emits newline-delimited JSON log lines, one object per event,
///   with the `prchecks.watch` span's `pr` field attached.
/// * `level` is the verbosity floor when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter(level));

    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}

/// `RUST_LOG` when set and valid, otherwise `level` for every target.
fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
