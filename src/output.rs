//! Progress bar, colored output, and summary formatting.
//!
//! All human-facing rendering lives here. The orchestrator feeds results
//! through [`ConsoleSink`] as they complete; the final summary and the JSON
//! document are printed by the CLI layer once the run is done.

use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::PROGRESS_TICK_MS;
use crate::models::{RepoResult, RepoState, SummaryStats};
use crate::orchestrator::ReportSink;

/// Renders per-repository results to the terminal as they complete.
///
/// Keeps an optional progress bar at the bottom of the output; quiet mode
/// suppresses everything except failures. The bar is created lazily once the
/// scan reports how many repositories there are.
pub struct ConsoleSink {
    progress: Mutex<Option<ProgressBar>>,
    show_progress: bool,
    verbose: bool,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool, quiet: bool, show_progress: bool) -> Self {
        Self {
            progress: Mutex::new(None),
            show_progress: show_progress && !quiet,
            verbose,
            quiet,
        }
    }

    /// Finishes and clears the progress bar. Call before printing the summary.
    pub fn finish(&self) {
        if let Some(bar) = self.progress.lock().expect("progress lock").take() {
            bar.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        match self.progress.lock().expect("progress lock").as_ref() {
            // println through the bar keeps the bar pinned below the output
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl ReportSink for ConsoleSink {
    fn on_scan_complete(&self, count: usize) {
        if !self.quiet {
            print_repos_found(count);
        }
        if self.show_progress && count > 0 {
            let bar = ProgressBar::new(count as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
            *self.progress.lock().expect("progress lock") = Some(bar);
        }
    }

    fn on_result(&self, result: &RepoResult) {
        if let Some(bar) = self.progress.lock().expect("progress lock").as_ref() {
            bar.inc(1);
            bar.set_message(result.name().to_string());
        }

        if self.quiet && result.state != RepoState::Failed {
            return;
        }

        self.println(format_result_line(result));
        if self.verbose
            && let Some(error) = &result.error
        {
            self.println(format!("   {}", format!("Error: {error}").dimmed()));
        }
    }
}

/// One status line per repository: symbol, name, branch, message.
pub fn format_result_line(result: &RepoResult) -> String {
    let symbol = match result.state {
        RepoState::Success => "✓".green().bold(),
        RepoState::Skipped => "⚠".yellow().bold(),
        RepoState::Failed => "✗".red().bold(),
        RepoState::DryRun => "→".blue().bold(),
    };
    let branch = match &result.branch {
        Some(branch) => format!(" ({branch})").cyan().to_string(),
        None => String::new(),
    };
    // multi-line messages (fast-forward details) collapse to their first line
    let message = result.message.lines().next().unwrap_or("").to_string();
    format!("{} {}{} - {}", symbol, result.name().white(), branch, message)
}

pub fn print_banner(root: &std::path::Path) {
    println!(
        "{}",
        format!("Gitty Up - Scanning {}...", root.display())
            .cyan()
            .bold()
    );
}

pub fn print_repos_found(count: usize) {
    let noun = if count == 1 {
        "repository"
    } else {
        "repositories"
    };
    println!("   Found {} git {}\n", count.to_string().bold(), noun);
}

pub fn print_dry_run_notice() {
    println!("{}", "DRY RUN MODE - No changes will be made".yellow().bold());
}

pub fn print_summary(stats: &SummaryStats) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  Repositories found: {}", stats.repos_found);
    if stats.repos_updated > 0 {
        println!(
            "  {} Successfully updated: {}",
            "✓".green(),
            stats.repos_updated
        );
    }
    if stats.repos_already_up_to_date > 0 {
        println!(
            "  {} Already up to date: {}",
            "✓".green(),
            stats.repos_already_up_to_date
        );
    }
    if stats.repos_skipped > 0 {
        println!("  {} Skipped: {}", "⚠".yellow(), stats.repos_skipped);
    }
    if stats.repos_failed > 0 {
        println!("  {} Failed: {}", "✗".red(), stats.repos_failed);
    }
    println!(
        "  Duration: {}",
        format_duration_secs(stats.duration_seconds).dimmed()
    );
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

fn format_duration_secs(seconds: f64) -> String {
    format!("{seconds:.2}s")
}
