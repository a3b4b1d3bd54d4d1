//! Test infrastructure shared by the integration suites.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use gittyup::git;
use tempfile::TempDir;

pub const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs a git command and fails the test on a non-zero exit.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = git::run(dir, args, GIT_TIMEOUT);
    anyhow::ensure!(
        output.success(),
        "git {} failed: {}",
        args.join(" "),
        output.combined()
    );
    Ok(output.stdout)
}

/// Initializes a git repository with one commit at `path`.
pub fn init_repo(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    run_git(path, &["init", "-b", "master"])?;
    run_git(path, &["config", "user.email", "test@example.com"])?;
    run_git(path, &["config", "user.name", "Test User"])?;
    std::fs::write(path.join("README.md"), "# Test Repo\n")?;
    run_git(path, &["add", "README.md"])?;
    run_git(path, &["commit", "-m", "Initial commit"])?;
    Ok(())
}

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a test repository with an initial commit and no remote.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        // canonicalized so results compare cleanly against scanner output
        let path = temp_dir.path().canonicalize()?;
        init_repo(&path)?;
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Creates a test repository tracking a bare remote.
    /// Returns the repo and the remote TempDir (must be kept alive).
    pub fn with_remote() -> Result<(Self, TempDir)> {
        let remote_dir = TempDir::new()?;
        run_git(remote_dir.path(), &["init", "--bare", "-b", "master"])?;

        let local = Self::new()?;
        run_git(
            &local.path,
            &[
                "remote",
                "add",
                "origin",
                remote_dir.path().to_str().unwrap(),
            ],
        )?;
        run_git(&local.path, &["push", "-u", "origin", "master"])?;

        Ok((local, remote_dir))
    }

    /// Modifies a tracked file so the worktree is dirty.
    pub fn make_dirty(&self) -> Result<()> {
        std::fs::write(self.path.join("README.md"), "# Changed\n")?;
        Ok(())
    }

    /// Adds a commit and pushes it, then rewinds the local branch so the
    /// repository is one commit behind its upstream.
    pub fn fall_behind_upstream(&self) -> Result<()> {
        std::fs::write(self.path.join("new_file.txt"), "content\n")?;
        run_git(self.path(), &["add", "new_file.txt"])?;
        run_git(self.path(), &["commit", "-m", "Second commit"])?;
        run_git(self.path(), &["push", "origin", "master"])?;
        run_git(self.path(), &["reset", "--hard", "HEAD~1"])?;
        Ok(())
    }

    pub fn detach_head(&self) -> Result<()> {
        run_git(self.path(), &["checkout", "--detach", "HEAD"])?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
