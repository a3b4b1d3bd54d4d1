//! Configuration loading and merging.
//!
//! A resolved [`Config`] is built by layering partial sources over the
//! defaults, lowest priority first:
//!
//! 1. built-in defaults
//! 2. user config file (`~/.config/gittyup/config.toml`)
//! 3. local config file (`.gittyup.toml` in the scanned root)
//! 4. command-line arguments
//!
//! Every field is replaced by the highest-priority source that sets it, except
//! `exclude_patterns`, which are unioned across all sources (and always
//! include the built-in defaults via the scanner's [`PathFilter`]).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_WORKERS, DEFAULT_TIMEOUT_SECS, LOCAL_CONFIG_FILE,
};
use crate::error::ConfigError;
use crate::models::UpdateStrategy;

/// Fully resolved, immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub root_path: PathBuf,
    pub max_depth: usize,
    pub exclude_patterns: Vec<String>,
    pub strategy: UpdateStrategy,
    pub dry_run: bool,
    pub skip_dirty: bool,
    pub timeout_seconds: u64,
    pub max_workers: usize,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            max_depth: DEFAULT_MAX_DEPTH,
            exclude_patterns: Vec::new(),
            strategy: UpdateStrategy::Pull,
            dry_run: false,
            skip_dirty: true,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_workers: DEFAULT_MAX_WORKERS,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Applies one partial layer on top of this configuration.
    pub fn merge(&mut self, layer: PartialConfig) {
        if let Some(max_depth) = layer.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(patterns) = layer.exclude_patterns {
            // union, order-preserving, deduped
            for pattern in patterns {
                if !self.exclude_patterns.contains(&pattern) {
                    self.exclude_patterns.push(pattern);
                }
            }
        }
        if let Some(strategy) = layer.strategy {
            self.strategy = strategy;
        }
        if let Some(skip_dirty) = layer.skip_dirty {
            self.skip_dirty = skip_dirty;
        }
        if let Some(timeout_seconds) = layer.timeout_seconds {
            self.timeout_seconds = timeout_seconds;
        }
        if let Some(max_workers) = layer.max_workers {
            self.max_workers = max_workers;
        }
        if let Some(verbose) = layer.verbose {
            self.verbose = verbose;
        }
        if let Some(quiet) = layer.quiet {
            self.quiet = quiet;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 {
            return Err(ConfigError::Invalid(
                "max_depth must be a positive integer".to_string(),
            ));
        }
        if self.timeout_seconds < 1 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be a positive integer".to_string(),
            ));
        }
        if self.max_workers < 1 {
            return Err(ConfigError::Invalid(
                "max_workers must be a positive integer".to_string(),
            ));
        }
        if self.verbose && self.quiet {
            return Err(ConfigError::Invalid(
                "cannot use both verbose and quiet modes simultaneously".to_string(),
            ));
        }
        Ok(())
    }
}

/// One configuration source with only the fields it actually sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub max_depth: Option<usize>,
    pub exclude_patterns: Option<Vec<String>>,
    pub strategy: Option<UpdateStrategy>,
    pub skip_dirty: Option<bool>,
    pub timeout_seconds: Option<u64>,
    pub max_workers: Option<usize>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
}

impl PartialConfig {
    /// Parses a TOML config file. A missing file yields an empty layer;
    /// unreadable or malformed content is a [`ConfigError`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let layer = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(layer)
    }
}

/// Resolves the final configuration from the default file locations plus a
/// CLI layer, or from an explicit config file when one was given (an explicit
/// file skips the default locations, mirroring `--config` semantics).
pub fn resolve(
    root_path: PathBuf,
    explicit_file: Option<&Path>,
    cli_layer: PartialConfig,
    dry_run: bool,
) -> Result<Config, ConfigError> {
    let mut config = Config {
        root_path: root_path.clone(),
        dry_run,
        ..Config::default()
    };

    if let Some(path) = explicit_file {
        if !path.exists() {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        config.merge(PartialConfig::from_file(path)?);
    } else {
        if let Some(user_file) = user_config_path() {
            config.merge(PartialConfig::from_file(&user_file)?);
        }
        config.merge(PartialConfig::from_file(&root_path.join(LOCAL_CONFIG_FILE))?);
    }

    config.merge(cli_layer);
    config.validate()?;
    Ok(config)
}

/// `~/.config/gittyup/config.toml` (honoring `XDG_CONFIG_HOME` via `dirs`).
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gittyup").join("config.toml"))
}
