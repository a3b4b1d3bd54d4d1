//! Error types for whole-run failures.
//!
//! Only preconditions that make the entire run impossible live here: a root
//! that cannot be scanned, a missing git binary, or invalid configuration.
//! Anything that goes wrong inside a single repository is folded into a
//! `Failed` result instead and never aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Raised when directory traversal cannot proceed at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raised when configuration cannot be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error type for a gittyup run.
#[derive(Debug, Error)]
pub enum GittyUpError {
    #[error(
        "git is not installed or not found in PATH. \
         Please install Git: https://git-scm.com/downloads"
    )]
    GitNotFound,

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
