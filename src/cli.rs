//! Command-line interface: argument parsing and the top-level run flow.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use crate::config::{self, PartialConfig};
use crate::error::GittyUpError;
use crate::models::UpdateStrategy;
use crate::orchestrator::{self, NoOpSink};
use crate::{git, output};

/// Gitty Up - Update all Git repositories in a directory tree.
///
/// Scans PATH (default: current directory) for Git repositories and pulls
/// changes from their remote repositories.
#[derive(Debug, Parser)]
#[command(name = "gittyup", version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for repositories
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum directory depth to traverse
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Directory names to exclude (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Update strategy to apply to each repository
    #[arg(long, value_enum)]
    pub strategy: Option<UpdateStrategy>,

    /// Show what would happen without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip repositories with uncommitted changes (default)
    #[arg(long, overrides_with = "no_skip_dirty")]
    pub skip_dirty: bool,

    /// Update repositories even when they have uncommitted changes
    #[arg(long)]
    pub no_skip_dirty: bool,

    /// Timeout in seconds for each git update command
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Number of repositories to update concurrently
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the summary as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Show detailed output
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output (errors and summary only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to a configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The CLI as a configuration layer; unset flags leave fields untouched.
    fn as_layer(&self) -> PartialConfig {
        PartialConfig {
            max_depth: self.max_depth,
            exclude_patterns: (!self.exclude.is_empty()).then(|| self.exclude.clone()),
            strategy: self.strategy,
            skip_dirty: if self.no_skip_dirty {
                Some(false)
            } else if self.skip_dirty {
                Some(true)
            } else {
                None
            },
            timeout_seconds: self.timeout,
            max_workers: self.jobs,
            verbose: self.verbose.then_some(true),
            quiet: self.quiet.then_some(true),
        }
    }
}

/// Runs a full scan-and-update cycle for the parsed arguments.
///
/// Fatal preconditions (bad config, missing git, unscannable root) surface as
/// errors; a completed run with failed repositories still prints the full
/// summary and maps to a failure exit code.
pub async fn run(cli: Cli) -> Result<ExitCode, GittyUpError> {
    if cli.no_color || cli.json {
        colored::control::set_override(false);
    }

    let config = config::resolve(
        cli.path.clone(),
        cli.config.as_deref(),
        cli.as_layer(),
        cli.dry_run,
    )?;

    init_tracing(config.verbose, config.quiet);
    info!(version = env!("CARGO_PKG_VERSION"), root = %config.root_path.display(), "starting gittyup");

    git::ensure_git_available()?;

    let human_output = !cli.json;
    if human_output && !config.quiet {
        output::print_banner(&config.root_path);
        if config.dry_run {
            output::print_dry_run_notice();
        }
    }

    let stats = if human_output {
        let sink = output::ConsoleSink::new(config.verbose, config.quiet, true);
        let stats = orchestrator::execute(&config, &sink).await?;
        sink.finish();
        output::print_summary(&stats);
        stats
    } else {
        let stats = orchestrator::execute(&config, &NoOpSink).await?;
        // to_string_pretty on a Value cannot fail
        println!(
            "{}",
            serde_json::to_string_pretty(&stats.to_json()).unwrap_or_default()
        );
        stats
    };

    if stats.repos_failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Logs go to stderr so stdout stays clean for `--json`. `RUST_LOG` overrides
/// the verbosity-derived level.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "gittyup=debug"
    } else if quiet {
        "gittyup=warn"
    } else {
        "gittyup=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["gittyup"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.dry_run);
        assert!(cli.exclude.is_empty());
        let layer = cli.as_layer();
        assert!(layer.max_depth.is_none());
        assert!(layer.skip_dirty.is_none());
        assert!(layer.exclude_patterns.is_none());
    }

    #[test]
    fn test_cli_flags_map_to_layer() {
        let cli = Cli::parse_from([
            "gittyup",
            "/tmp",
            "--max-depth",
            "3",
            "--exclude",
            "target",
            "--exclude",
            "vendor",
            "--strategy",
            "rebase",
            "--no-skip-dirty",
            "--jobs",
            "8",
        ]);
        let layer = cli.as_layer();
        assert_eq!(cli.path, PathBuf::from("/tmp"));
        assert_eq!(layer.max_depth, Some(3));
        assert_eq!(
            layer.exclude_patterns,
            Some(vec!["target".to_string(), "vendor".to_string()])
        );
        assert_eq!(layer.strategy, Some(UpdateStrategy::Rebase));
        assert_eq!(layer.skip_dirty, Some(false));
        assert_eq!(layer.max_workers, Some(8));
    }

    #[test]
    fn test_skip_dirty_flag_wins_over_default() {
        let cli = Cli::parse_from(["gittyup", "--skip-dirty"]);
        assert_eq!(cli.as_layer().skip_dirty, Some(true));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["gittyup", "-v", "-q"]).is_err());
    }
}
