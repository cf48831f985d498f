//! Report rendering for terminals, pipes and JSON consumers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use prchecks_core::{
    sort_checks, AggregateCounts, Bucket, Outcome, PullRequestRef, UnifiedCheck, WatchReport,
};

/// Clear the screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const COLUMN_GAP: usize = 2;

/// Headline and tallies, shown on terminals only and only when there is
/// at least one check.
pub fn summary(counts: &AggregateCounts, tty: bool) -> String {
    if !tty || counts.total() == 0 {
        return String::new();
    }

    let headline = if counts.failed > 0 {
        "Some checks were not successful".red().bold().to_string()
    } else if counts.pending > 0 {
        "Some checks are still pending".yellow().bold().to_string()
    } else if counts.cancelled > 0 {
        "Some checks were cancelled".bright_black().bold().to_string()
    } else {
        "All checks were successful".green().bold().to_string()
    };

    let tallies = format!(
        "{} cancelled, {} failing, {} successful, {} skipped, and {} pending checks",
        counts.cancelled, counts.failed, counts.passed, counts.skipping, counts.pending
    );
    format!("{headline}\n{tallies}\n\n")
}

fn mark(bucket: Bucket) -> (&'static str, Style) {
    match bucket {
        Bucket::Fail => ("X", Style::new().red()),
        Bucket::Pending => ("*", Style::new().yellow()),
        Bucket::Skipping | Bucket::Cancel => ("-", Style::new().bright_black()),
        Bucket::Pass => ("✓", Style::new().green()),
    }
}

/// Sorted check table.
///
/// Terminals get a colored mark column followed by name, description,
/// elapsed and link. Pipes get plain `NAME STATUS ELAPSED URL DESCRIPTION`
/// columns, with cancelled checks reported as `fail`.
pub fn table(checks: &[UnifiedCheck], tty: bool) -> String {
    let mut sorted = checks.to_vec();
    sort_checks(&mut sorted);

    if tty {
        let rows: Vec<Vec<String>> = sorted
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.description.clone(),
                    format_elapsed(c.started_at, c.completed_at),
                    c.link.clone(),
                ]
            })
            .collect();
        let header = ["NAME", "DESCRIPTION", "ELAPSED", "URL"];
        let widths = column_widths(&header, &rows);

        let mut out = format!("{}{}\n", " ".repeat(1 + COLUMN_GAP), pad_row(&header, &widths));
        for (check, row) in sorted.iter().zip(&rows) {
            let (symbol, style) = mark(check.bucket);
            out.push_str(&format!(
                "{}{}{}\n",
                symbol.style(style),
                " ".repeat(COLUMN_GAP),
                pad_row(row, &widths)
            ));
        }
        out
    } else {
        let rows: Vec<Vec<String>> = sorted
            .iter()
            .map(|c| {
                let status = match c.bucket {
                    Bucket::Cancel => Bucket::Fail.as_str(),
                    other => other.as_str(),
                };
                let elapsed = format_elapsed(c.started_at, c.completed_at);
                vec![
                    c.name.clone(),
                    status.to_string(),
                    if elapsed.is_empty() { "0".to_string() } else { elapsed },
                    c.link.clone(),
                    c.description.clone(),
                ]
            })
            .collect();
        let header = ["NAME", "STATUS", "ELAPSED", "URL", "DESCRIPTION"];
        let widths = column_widths(&header, &rows);

        let mut out = format!("{}\n", pad_row(&header, &widths));
        for row in &rows {
            out.push_str(&pad_row(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn column_widths<S: AsRef<str>>(header: &[&str], rows: &[Vec<S>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_ref().chars().count());
        }
    }
    widths
}

fn pad_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let cell = cell.as_ref();
        line.push_str(cell);
        if i + 1 < cells.len() {
            let pad = width.saturating_sub(cell.chars().count()) + COLUMN_GAP;
            line.push_str(&" ".repeat(pad));
        }
    }
    line.trim_end().to_string()
}

/// Screen reset plus refresh banner, drawn before every watch-mode frame on
/// a terminal.
pub fn watch_banner(interval: Duration) -> String {
    format!(
        "{CLEAR_SCREEN}Refreshing checks status every {:.0}s. Press Ctrl+C to quit.\n\n",
        interval.as_secs_f64()
    )
}

/// Summary and table for one aggregate.
pub fn frame(counts: &AggregateCounts, checks: &[UnifiedCheck], tty: bool) -> String {
    let mut out = summary(counts, tty);
    out.push_str(&table(checks, tty));
    out
}

/// Time from start to completion rounded to whole seconds, written like
/// `1h2m3s`, `4m0s` or `12s`. Empty when either timestamp is missing or the
/// span is not positive.
pub fn format_elapsed(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
) -> String {
    let (Some(start), Some(end)) = (started_at, completed_at) else {
        return String::new();
    };
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return String::new();
    }

    let secs = (millis + 500) / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    pull_request: &'a PullRequestRef,
    outcome: Outcome,
    exit_code: i32,
    counts: &'a AggregateCounts,
    checks: Vec<UnifiedCheck>,
}

/// Final report as pretty-printed JSON, checks in display order.
pub fn json_report(report: &WatchReport) -> serde_json::Result<String> {
    let mut checks = report.aggregate.checks.clone();
    sort_checks(&mut checks);
    serde_json::to_string_pretty(&JsonReport {
        pull_request: &report.pull_request,
        outcome: report.outcome,
        exit_code: report.outcome.exit_code(),
        counts: &report.aggregate.counts,
        checks,
    })
}

/// One-line description of a resolved pull request.
pub fn pull_request_line(pr: &PullRequestRef) -> String {
    format!("#{}\t{}\t{}", pr.number, pr.head_branch, pr.head_sha)
}
