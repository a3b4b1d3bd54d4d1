//! Per-repository update logic.
//!
//! For one repository root this determines the current branch, dirty state and
//! upstream presence, runs the configured update command, and classifies the
//! outcome into a [`RepoResult`]. Nothing here ever propagates an error: every
//! failure mode becomes a `Failed` result so one bad repository cannot abort
//! the run.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::constants::QUERY_TIMEOUT_SECS;
use crate::git;
use crate::models::{RepoResult, RepoState, UpdateStrategy};

pub const MSG_UNCOMMITTED: &str = "Uncommitted changes";
pub const MSG_NO_UPSTREAM: &str = "No upstream configured";
pub const MSG_UP_TO_DATE: &str = "Already up to date";
pub const MSG_PULL_FAILED: &str = "Pull failed";
pub const MSG_DRY_RUN: &str = "Would update (dry run)";

/// Runs the update state machine against one repository.
///
/// Steps, first match wins: dirty + `skip_dirty` → Skipped; no upstream →
/// Skipped; update command exit 0 → Success (up-to-date or updated); non-zero
/// exit, timeout or spawn failure → Failed.
pub async fn pull(
    repo_path: &Path,
    strategy: UpdateStrategy,
    skip_dirty: bool,
    timeout: Duration,
) -> RepoResult {
    let query_timeout = Duration::from_secs(QUERY_TIMEOUT_SECS);

    let branch = current_branch(repo_path, query_timeout).await;
    let dirty = has_uncommitted_changes(repo_path, query_timeout).await;

    if dirty && skip_dirty {
        info!(repo = %repo_path.display(), "skipped: uncommitted changes");
        return RepoResult {
            path: repo_path.to_path_buf(),
            state: RepoState::Skipped,
            branch,
            message: MSG_UNCOMMITTED.to_string(),
            error: None,
            has_uncommitted_changes: true,
            commits_pulled: 0,
        };
    }

    if !has_upstream(repo_path, query_timeout).await {
        info!(repo = %repo_path.display(), "skipped: no upstream");
        return RepoResult {
            path: repo_path.to_path_buf(),
            state: RepoState::Skipped,
            branch,
            message: MSG_NO_UPSTREAM.to_string(),
            error: None,
            has_uncommitted_changes: dirty,
            commits_pulled: 0,
        };
    }

    let output = git::run_async(repo_path, strategy.args(), timeout).await;

    if output.success() {
        let combined = output.combined();
        let (message, commits_pulled) = classify_success(&combined);
        debug!(repo = %repo_path.display(), commits = commits_pulled, "update succeeded");
        RepoResult {
            path: repo_path.to_path_buf(),
            state: RepoState::Success,
            branch,
            message,
            error: None,
            has_uncommitted_changes: dirty,
            commits_pulled,
        }
    } else {
        let error = if output.stderr.is_empty() {
            output.stdout.clone()
        } else {
            output.stderr.clone()
        };
        warn!(repo = %repo_path.display(), error = %error, "update failed");
        RepoResult {
            path: repo_path.to_path_buf(),
            state: RepoState::Failed,
            branch,
            message: MSG_PULL_FAILED.to_string(),
            error: Some(error),
            has_uncommitted_changes: dirty,
            commits_pulled: 0,
        }
    }
}

/// Builds the result for a repository in dry-run mode. The branch, dirty and
/// upstream queries still run so the decisions are visible, but no mutating
/// command is ever issued.
pub async fn dry_run(repo_path: &Path, skip_dirty: bool) -> RepoResult {
    let query_timeout = Duration::from_secs(QUERY_TIMEOUT_SECS);

    let branch = current_branch(repo_path, query_timeout).await;
    let dirty = has_uncommitted_changes(repo_path, query_timeout).await;

    let message = if dirty && skip_dirty {
        format!("Would skip: {}", MSG_UNCOMMITTED.to_lowercase())
    } else if !has_upstream(repo_path, query_timeout).await {
        format!("Would skip: {}", MSG_NO_UPSTREAM.to_lowercase())
    } else {
        MSG_DRY_RUN.to_string()
    };

    RepoResult {
        path: repo_path.to_path_buf(),
        state: RepoState::DryRun,
        branch,
        message,
        error: None,
        has_uncommitted_changes: dirty,
        commits_pulled: 0,
    }
}

/// Current branch name, or `None` when HEAD is detached.
async fn current_branch(repo_path: &Path, timeout: Duration) -> Option<String> {
    let output = git::run_async(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"], timeout).await;
    if !output.success() {
        return None;
    }
    let branch = output.stdout.trim();
    // rev-parse prints the literal "HEAD" for a detached head
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch.to_string())
    }
}

async fn has_uncommitted_changes(repo_path: &Path, timeout: Duration) -> bool {
    let output = git::run_async(repo_path, &["status", "--porcelain"], timeout).await;
    output.success() && !output.stdout.trim().is_empty()
}

async fn has_upstream(repo_path: &Path, timeout: Duration) -> bool {
    git::run_async(
        repo_path,
        &["rev-parse", "--abbrev-ref", "@{upstream}"],
        timeout,
    )
    .await
    .success()
}

/// Classifies successful update output into a message and a commit count.
///
/// "Already up to date" (either hyphenation) maps to the canonical message
/// with zero commits. Anything else keeps the relevant raw output lines and a
/// best-effort commit count: git does not print the number of commits a pull
/// advanced, so the count is 1 whenever only qualitative markers
/// ("Fast-forward", an `Updating a..b` range) are present. The count is
/// metadata for reporting, nothing downstream depends on its exact value.
fn classify_success(output: &str) -> (String, u32) {
    if output.contains("Already up to date") || output.contains("Already up-to-date") {
        return (MSG_UP_TO_DATE.to_string(), 0);
    }

    let relevant: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("Fast-forward") || line.starts_with("Updating "))
        .collect();

    let message = if relevant.is_empty() {
        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Successfully updated")
            .to_string()
    } else {
        relevant.join("\n")
    };

    (message, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_up_to_date_both_spellings() {
        assert_eq!(
            classify_success("Already up to date.\n"),
            (MSG_UP_TO_DATE.to_string(), 0)
        );
        assert_eq!(
            classify_success("Already up-to-date.\n"),
            (MSG_UP_TO_DATE.to_string(), 0)
        );
    }

    #[test]
    fn test_classify_fast_forward_keeps_marker_lines() {
        let output = "Updating ab12cd3..ef45ab6\nFast-forward\n README.md | 2 +-\n 1 file changed";
        let (message, commits) = classify_success(output);
        assert!(message.contains("Fast-forward"));
        assert!(message.contains("Updating ab12cd3..ef45ab6"));
        assert_eq!(commits, 1);
    }

    #[test]
    fn test_classify_unrecognized_output_is_never_zero_commits() {
        let (message, commits) = classify_success("Merge made by the 'ort' strategy.\n");
        assert_eq!(message, "Merge made by the 'ort' strategy.");
        assert_eq!(commits, 1);
    }

    #[test]
    fn test_classify_empty_output_falls_back() {
        let (message, commits) = classify_success("");
        assert_eq!(message, "Successfully updated");
        assert_eq!(commits, 1);
    }
}
