//! Run orchestration: one scan, then bounded-concurrency updates.

use std::time::{Duration, Instant};

use futures::StreamExt;
use futures::stream;
use tracing::info;

use crate::config::Config;
use crate::error::GittyUpError;
use crate::models::{RepoResult, SummaryStats};
use crate::repo;
use crate::scanner::RepositoryScanner;

/// Receives run progress events. Implemented by the console renderer; tests
/// plug in a no-op.
pub trait ReportSink: Send + Sync {
    /// Called once, after scanning and before any update starts.
    fn on_scan_complete(&self, _count: usize) {}

    /// Called for each repository result as it completes.
    fn on_result(&self, result: &RepoResult);
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ReportSink for NoOpSink {
    fn on_result(&self, _result: &RepoResult) {}
}

/// Scans once, updates every discovered repository, and folds the results
/// into a summary.
///
/// Updates run through a stream with at most `max_workers` in flight;
/// `buffered` yields completions in scan order, so the `results` list is
/// deterministic regardless of worker count. A failure in one repository
/// never touches its siblings; only the scan itself can fail here.
pub async fn execute(config: &Config, sink: &dyn ReportSink) -> Result<SummaryStats, GittyUpError> {
    let start = Instant::now();

    let scanner = RepositoryScanner::new(config.max_depth, config.exclude_patterns.clone());
    let repositories = scanner.scan(&config.root_path)?;

    info!(found = repositories.len(), root = %config.root_path.display(), "scan finished");
    sink.on_scan_complete(repositories.len());

    let mut stats = SummaryStats {
        repos_found: repositories.len(),
        ..Default::default()
    };

    if repositories.is_empty() {
        stats.duration_seconds = start.elapsed().as_secs_f64();
        return Ok(stats);
    }

    let timeout = Duration::from_secs(config.timeout_seconds);
    let mut results = stream::iter(repositories)
        .map(|path| async move {
            if config.dry_run {
                repo::dry_run(&path, config.skip_dirty).await
            } else {
                repo::pull(&path, config.strategy, config.skip_dirty, timeout).await
            }
        })
        .buffered(config.max_workers);

    while let Some(result) = results.next().await {
        sink.on_result(&result);
        stats.add_result(result);
    }

    stats.duration_seconds = start.elapsed().as_secs_f64();
    info!(
        updated = stats.repos_updated,
        up_to_date = stats.repos_already_up_to_date,
        skipped = stats.repos_skipped,
        failed = stats.repos_failed,
        duration_seconds = stats.duration_seconds,
        "run finished"
    );
    Ok(stats)
}
