//! prchecks - pull request CI status from the command line
//!
//! ## Commands
//!
//! - `checks`: Show (or watch) the aggregated CI status of a pull request
//! - `resolve`: Print the pull request a selector points at
//!
//! ## Exit codes
//!
//! `checks` exits 0 when every check passed, 1 when any failed and 8 while
//! checks are still pending. Any error exits 1.

mod config;
mod render;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, Level};

use prchecks_core::{
    current_branch, detect_repo, resolve_pull_request, ConvergenceLoop, PullRequestRef,
    PullRequestSelector, TokioSleeper,
};
use prchecks_github::GithubClient;

use crate::config::{Connection, ConnectionArgs, PollArgs};

#[derive(Parser)]
#[command(name = "prchecks")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull request CI status aggregation", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show CI status for a pull request
    Checks(ChecksArgs),

    /// Resolve a selector to a pull request and print it
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct ChecksArgs {
    /// Pull request number, URL or branch (default: current branch)
    selector: Option<String>,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    poll: PollArgs,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResolveArgs {
    /// Pull request number, URL or branch (default: current branch)
    selector: Option<String>,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Print the pull request as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    prchecks_core::init_tracing(cli.log_json, level);

    let result = match cli.command {
        Commands::Checks(args) => cmd_checks(args).await,
        Commands::Resolve(args) => cmd_resolve(args).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn connect(args: &ConnectionArgs) -> Result<(Connection, GithubClient)> {
    let connection = args.resolve(env_var, || detect_repo(Path::new(".")))?;
    debug!(
        repo = %connection.repo,
        api = %connection.github.api_url,
        signals = %connection.github.signals_url(),
        "resolved configuration"
    );
    let client =
        GithubClient::new(connection.github.clone()).context("failed to create GitHub client")?;
    Ok((connection, client))
}

async fn find_pull_request(
    client: &GithubClient,
    connection: &Connection,
    selector: Option<&str>,
) -> Result<PullRequestRef> {
    let selector = PullRequestSelector::parse(selector.unwrap_or_default())?;
    let pr = resolve_pull_request(client, &connection.repo, &selector, || {
        current_branch(Path::new("."))
    })
    .await?;
    Ok(pr)
}

async fn cmd_checks(args: ChecksArgs) -> Result<ExitCode> {
    let options = args.poll.resolve()?;
    let (connection, client) = connect(&args.connection)?;
    let pr = find_pull_request(&client, &connection, args.selector.as_deref()).await?;

    let tty = !args.json && io::stdout().is_terminal();
    let sleeper = TokioSleeper;
    let watch = ConvergenceLoop::new(&client, &sleeper, options)?;

    let mut stdout = io::stdout();
    let mut draw_error = None;
    let report = watch
        .run(&connection.repo, &pr, |snap| {
            // Intermediate frames only; the final state is drawn once below.
            if args.json || !options.watch || snap.is_final() || draw_error.is_some() {
                return;
            }
            let mut out = String::new();
            if tty {
                out.push_str(&render::watch_banner(options.interval));
            }
            out.push_str(&render::frame(&snap.aggregate.counts, &snap.aggregate.checks, tty));
            if let Err(err) = stdout.write_all(out.as_bytes()).and_then(|_| stdout.flush()) {
                draw_error = Some(err);
            }
        })
        .await?;
    if let Some(err) = draw_error {
        return Err(err).context("failed to write report");
    }

    let out = if args.json {
        let mut json = render::json_report(&report).context("failed to serialize report")?;
        json.push('\n');
        json
    } else {
        let mut out = String::new();
        if tty && options.watch {
            out.push_str(render::CLEAR_SCREEN);
        }
        out.push_str(&render::frame(
            &report.aggregate.counts,
            &report.aggregate.checks,
            tty,
        ));
        out
    };
    stdout
        .write_all(out.as_bytes())
        .and_then(|_| stdout.flush())
        .context("failed to write report")?;

    Ok(ExitCode::from(report.outcome.exit_code() as u8))
}

async fn cmd_resolve(args: ResolveArgs) -> Result<ExitCode> {
    let (connection, client) = connect(&args.connection)?;
    let pr = find_pull_request(&client, &connection, args.selector.as_deref()).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&pr).context("failed to serialize pull request")?
        );
    } else {
        println!("{}", render::pull_request_line(&pr));
    }
    Ok(ExitCode::SUCCESS)
}
