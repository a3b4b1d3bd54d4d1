//! Directory traversal for discovering git repositories.
//!
//! The scanner walks a tree depth-first, records every directory that directly
//! contains a `.git` directory, and never descends into repository internals,
//! hidden directories, excluded names, or symlinked directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{DEFAULT_EXCLUDES, GIT_DIR};
use crate::error::ScanError;

/// Decides whether a directory name is excluded from traversal.
///
/// Matching is exact string comparison, not globbing. The default exclusion
/// set is always unioned with caller-supplied patterns.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: BTreeSet<String>,
}

impl PathFilter {
    pub fn new<I, S>(extra_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns: BTreeSet<String> =
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        patterns.extend(extra_patterns.into_iter().map(Into::into));
        Self { patterns }
    }

    /// True if `name` must not be traversed: configured pattern or hidden.
    /// Symlink detection is the scanner's job since it is not a name property.
    pub fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.') || self.patterns.contains(name)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// Scans a directory tree for git repositories.
#[derive(Debug)]
pub struct RepositoryScanner {
    max_depth: usize,
    filter: PathFilter,
}

impl RepositoryScanner {
    pub fn new<I, S>(max_depth: usize, exclude_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_depth,
            filter: PathFilter::new(exclude_patterns),
        }
    }

    /// Returns all repository roots beneath `root`, sorted by path.
    ///
    /// Fails only when the root itself cannot be traversed; unreadable
    /// subdirectories are skipped and contribute no repositories.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut repositories = Vec::new();
        self.scan_directory(&root, 0, &mut repositories, true)?;
        repositories.sort();

        debug!(
            root = %root.display(),
            found = repositories.len(),
            "scan complete"
        );
        Ok(repositories)
    }

    fn scan_directory(
        &self,
        directory: &Path,
        depth: usize,
        repositories: &mut Vec<PathBuf>,
        is_root: bool,
    ) -> Result<(), ScanError> {
        // A repository root is recorded as a unit; its internals are never
        // scanned, so nested metadata directories cannot produce duplicates.
        if is_git_repository(directory) {
            repositories.push(directory.to_path_buf());
            return Ok(());
        }

        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(source) if is_root => {
                return Err(ScanError::Io {
                    path: directory.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                // Unreadable subtree: this branch yields nothing, scanning
                // continues elsewhere.
                warn!(path = %directory.display(), error = %source, "skipping unreadable directory");
                return Ok(());
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();

            // symlink_metadata so a symlink to a directory is seen as a link
            let Ok(meta) = path.symlink_metadata() else {
                continue;
            };
            if !meta.is_dir() || meta.is_symlink() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.filter.is_excluded(name) {
                continue;
            }
            if depth + 1 > self.max_depth {
                continue;
            }

            self.scan_directory(&path, depth + 1, repositories, false)?;
        }

        Ok(())
    }
}

/// True if `path` directly contains a `.git` directory.
pub fn is_git_repository(path: &Path) -> bool {
    path.join(GIT_DIR).is_dir()
}
