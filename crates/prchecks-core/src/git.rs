//! Git integration utilities for locating the pull request to inspect.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ChecksError, RepoRef, Result};

static REMOTE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn run_git(dir: &Path, args: &[&str]) -> std::result::Result<String, String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| format!("failed to run git: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {} failed: {}", args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Name of the branch checked out in `repo_dir`.
///
/// Runs `git rev-parse --abbrev-ref HEAD`. A detached HEAD has no branch and
/// is reported as [`ChecksError::NoBranchDetected`], like any git failure.
pub fn current_branch(repo_dir: &Path) -> Result<String> {
    let branch = run_git(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])
        .map_err(ChecksError::NoBranchDetected)?;

    match branch.as_str() {
        "" => Err(ChecksError::NoBranchDetected(
            "git rev-parse returned empty output".to_string(),
        )),
        "HEAD" => Err(ChecksError::NoBranchDetected("HEAD is detached".to_string())),
        _ => Ok(branch),
    }
}

/// Extract `owner/name` from a GitHub remote URL (https or ssh form).
pub fn parse_git_remote(remote: &str) -> Option<RepoRef> {
    let pattern = REMOTE_PATTERN.get_or_init(|| {
        Regex::new(r"github\.com[:/]([^/]+)/([^/.]+?)(?:\.git)?$").expect("valid remote pattern")
    });
    let caps = pattern.captures(remote.trim())?;
    Some(RepoRef::new(&caps[1], &caps[2]))
}

/// Infer the repository from the `origin` remote of `repo_dir`.
pub fn detect_repo(repo_dir: &Path) -> Option<RepoRef> {
    let remote = run_git(repo_dir, &["remote", "get-url", "origin"]).ok()?;
    parse_git_remote(&remote)
}
