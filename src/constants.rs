//! Application-wide constants.
//!
//! Centralized configuration defaults to avoid magic numbers throughout the codebase.

/// Default maximum directory depth to traverse while scanning.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default timeout for a single git update command (in seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for quick repository queries (branch, status, upstream).
pub const QUERY_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent repository updates.
/// Low by default: each worker spawns its own git subprocess.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Directory names that are never scanned, regardless of configuration.
/// Caller-supplied exclude patterns are unioned with these, never replace them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    "build",
    "dist",
];

/// Git directory name used to detect repositories.
pub const GIT_DIR: &str = ".git";

/// Local configuration file name, looked up in the scanned root.
pub const LOCAL_CONFIG_FILE: &str = ".gittyup.toml";

/// Progress bar tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Default name used when a repository name cannot be determined from its path.
pub const DEFAULT_REPO_NAME: &str = "repository";
