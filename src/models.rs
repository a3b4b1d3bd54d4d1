//! Result and summary types shared between the updater and the orchestrator.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which git command sequence the updater issues per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    #[default]
    Pull,
    Fetch,
    Rebase,
}

impl UpdateStrategy {
    /// The git arguments this strategy runs.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            UpdateStrategy::Pull => &["pull", "--all"],
            UpdateStrategy::Fetch => &["fetch", "--all"],
            UpdateStrategy::Rebase => &["pull", "--rebase"],
        }
    }
}

/// Terminal classification of one repository's processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoState {
    Success,
    Skipped,
    Failed,
    DryRun,
}

/// Outcome of processing a single repository. Built exactly once by the
/// updater (or the orchestrator in dry-run mode) and never mutated after.
#[derive(Debug, Clone, Serialize)]
pub struct RepoResult {
    pub path: PathBuf,
    pub state: RepoState,
    pub branch: Option<String>,
    pub message: String,
    pub error: Option<String>,
    pub has_uncommitted_changes: bool,
    pub commits_pulled: u32,
}

impl RepoResult {
    /// Repository name for display, derived from the last path component.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(crate::constants::DEFAULT_REPO_NAME)
    }
}

/// Aggregate statistics for one run. Owned by the orchestrator; updated only
/// through [`SummaryStats::add_result`].
#[derive(Debug, Default)]
pub struct SummaryStats {
    pub repos_found: usize,
    pub repos_updated: usize,
    pub repos_already_up_to_date: usize,
    pub repos_skipped: usize,
    pub repos_failed: usize,
    pub duration_seconds: f64,
    pub results: Vec<RepoResult>,
}

impl SummaryStats {
    /// Folds one repository result into the counters.
    ///
    /// A `Success` counts as "already up to date" only when no commits were
    /// pulled and the message says so; every other success is an update.
    /// Dry-run results are recorded but counted nowhere.
    pub fn add_result(&mut self, result: RepoResult) {
        match result.state {
            RepoState::Success => {
                if result.commits_pulled == 0 && result.message.contains("Already up to date") {
                    self.repos_already_up_to_date += 1;
                } else {
                    self.repos_updated += 1;
                }
            }
            RepoState::Skipped => self.repos_skipped += 1,
            RepoState::Failed => self.repos_failed += 1,
            RepoState::DryRun => {}
        }
        self.results.push(result);
    }

    /// Machine-readable form of the summary, shaped as
    /// `{ summary: {..}, repositories: [..] }` with two-decimal duration.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "summary": {
                "repos_found": self.repos_found,
                "repos_updated": self.repos_updated,
                "repos_already_up_to_date": self.repos_already_up_to_date,
                "repos_skipped": self.repos_skipped,
                "repos_failed": self.repos_failed,
                "duration_seconds": (self.duration_seconds * 100.0).round() / 100.0,
            },
            "repositories": self.results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(state: RepoState, message: &str, commits_pulled: u32) -> RepoResult {
        RepoResult {
            path: PathBuf::from("/tmp/repo"),
            state,
            branch: Some("main".to_string()),
            message: message.to_string(),
            error: None,
            has_uncommitted_changes: false,
            commits_pulled,
        }
    }

    #[test]
    fn test_success_with_zero_commits_counts_as_up_to_date() {
        let mut stats = SummaryStats::default();
        stats.add_result(result(RepoState::Success, "Already up to date", 0));
        assert_eq!(stats.repos_already_up_to_date, 1);
        assert_eq!(stats.repos_updated, 0);
    }

    #[test]
    fn test_success_with_commits_counts_as_updated() {
        let mut stats = SummaryStats::default();
        stats.add_result(result(RepoState::Success, "Fast-forward", 3));
        assert_eq!(stats.repos_updated, 1);
        assert_eq!(stats.repos_already_up_to_date, 0);
    }

    #[test]
    fn test_success_with_zero_commits_but_other_message_counts_as_updated() {
        // Both conditions are required for the up-to-date bucket.
        let mut stats = SummaryStats::default();
        stats.add_result(result(RepoState::Success, "Fetched origin", 0));
        assert_eq!(stats.repos_updated, 1);
    }

    #[test]
    fn test_skipped_and_failed_counters() {
        let mut stats = SummaryStats::default();
        stats.add_result(result(RepoState::Skipped, "Uncommitted changes", 0));
        stats.add_result(result(RepoState::Failed, "Pull failed", 0));
        assert_eq!(stats.repos_skipped, 1);
        assert_eq!(stats.repos_failed, 1);
        assert_eq!(stats.results.len(), 2);
    }

    #[test]
    fn test_dry_run_recorded_but_not_counted() {
        let mut stats = SummaryStats::default();
        stats.add_result(result(RepoState::DryRun, "Would pull", 0));
        assert_eq!(stats.repos_updated, 0);
        assert_eq!(stats.repos_skipped, 0);
        assert_eq!(stats.repos_failed, 0);
        assert_eq!(stats.results.len(), 1);
    }

    #[test]
    fn test_json_shape_and_state_tags() {
        let mut stats = SummaryStats {
            repos_found: 2,
            duration_seconds: 1.23456,
            ..Default::default()
        };
        stats.add_result(result(RepoState::Success, "Already up to date", 0));
        stats.add_result(result(RepoState::DryRun, "Would pull", 0));

        let json = stats.to_json();
        assert_eq!(json["summary"]["repos_found"], 2);
        assert_eq!(json["summary"]["repos_already_up_to_date"], 1);
        assert_eq!(json["summary"]["duration_seconds"], 1.23);
        assert_eq!(json["repositories"][0]["state"], "success");
        assert_eq!(json["repositories"][1]["state"], "dry_run");
        assert_eq!(json["repositories"][0]["has_uncommitted_changes"], false);
    }
}
