//! Git command execution.
//!
//! A thin wrapper around the git CLI. Commands are run with the repository as
//! the working directory and a hard timeout; failures of any kind (non-zero
//! exit, timeout, spawn error) are reported through [`GitOutput`] rather than
//! as errors, so callers classify outcomes instead of unwinding.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::constants::QUERY_TIMEOUT_SECS;
use crate::error::GittyUpError;

/// Captured outcome of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output, used for message matching where git splits
    /// information across both streams (fetch writes to stderr).
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    fn local_failure(message: String) -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: message,
        }
    }
}

/// Runs `git <args>` in `repo_path`, blocking until it exits or the timeout
/// elapses. On timeout the child is killed and reaped, and the call returns
/// exit code 1 with a "timed out" message in stderr.
pub fn run(repo_path: &Path, args: &[&str], timeout: Duration) -> GitOutput {
    let child = std::process::Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            return GitOutput::local_failure(format!("failed to run git {}: {e}", args.join(" ")));
        }
    };

    // Drain both pipes on background threads so a chatty command cannot
    // deadlock against a full pipe buffer while we poll for exit.
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                // The readers are not joined here: descendants of the killed
                // child can keep the pipe write-ends open long past the
                // deadline, and the timeout result discards output anyway.
                return GitOutput::local_failure(timeout_message(args, timeout));
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(20)),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return GitOutput::local_failure(format!(
                    "failed waiting for git {}: {e}",
                    args.join(" ")
                ));
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    debug!(args = %args.join(" "), code = status.code().unwrap_or(-1), "git finished");
    GitOutput {
        exit_code: status.code().unwrap_or(1),
        stdout,
        stderr,
    }
}

/// Async variant of [`run`] with identical semantics.
///
/// The child is spawned with `kill_on_drop` so cancelling the owning task
/// kills the subprocess; on timeout it is killed and awaited explicitly
/// before returning, so no zombie outlives the call.
pub async fn run_async(repo_path: &Path, args: &[&str], timeout: Duration) -> GitOutput {
    let child = tokio::process::Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            return GitOutput::local_failure(format!("failed to run git {}: {e}", args.join(" ")));
        }
    };

    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    // Both pipes are drained concurrently with the wait so a chatty command
    // cannot deadlock against a full pipe buffer.
    let wait = async {
        let (status, _, _) = tokio::try_join!(
            child.wait(),
            async {
                match stdout_pipe.as_mut() {
                    Some(pipe) => pipe.read_to_end(&mut stdout).await.map(|_| ()),
                    None => Ok(()),
                }
            },
            async {
                match stderr_pipe.as_mut() {
                    Some(pipe) => pipe.read_to_end(&mut stderr).await.map(|_| ()),
                    None => Ok(()),
                }
            },
        )?;
        Ok::<_, std::io::Error>(status)
    };

    // bind first so the wait future (and its borrow of child) is dropped
    // before the kill below
    let waited = tokio::time::timeout(timeout, wait).await;

    match waited {
        Ok(Ok(status)) => {
            debug!(args = %args.join(" "), code = status.code().unwrap_or(-1), "git finished");
            GitOutput {
                exit_code: status.code().unwrap_or(1),
                stdout: String::from_utf8_lossy(&stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            }
        }
        Ok(Err(e)) => {
            let _ = child.kill().await;
            GitOutput::local_failure(format!("failed waiting for git {}: {e}", args.join(" ")))
        }
        Err(_elapsed) => {
            let _ = child.kill().await;
            GitOutput::local_failure(timeout_message(args, timeout))
        }
    }
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> std::thread::JoinHandle<String>
where
    R: std::io::Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            use std::io::Read;
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).trim().to_string()
    })
}

fn timeout_message(args: &[&str], timeout: Duration) -> String {
    format!(
        "git {} timed out after {}s",
        args.join(" "),
        timeout.as_secs()
    )
}

/// Checks whether the git binary is available in PATH.
pub fn check_git_available() -> bool {
    run(
        Path::new("."),
        &["--version"],
        Duration::from_secs(QUERY_TIMEOUT_SECS),
    )
    .success()
}

/// Whole-run precondition: fails with [`GittyUpError::GitNotFound`] when the
/// git binary is missing. Checked once before any scanning begins.
pub fn ensure_git_available() -> Result<(), GittyUpError> {
    if check_git_available() {
        Ok(())
    } else {
        Err(GittyUpError::GitNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let output = run(Path::new("."), &["--version"], Duration::from_secs(5));
        assert!(output.success());
        assert!(output.stdout.starts_with("git version"));
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_run_reports_nonzero_exit_without_error() {
        let output = run(
            Path::new("."),
            &["definitely-not-a-subcommand"],
            Duration::from_secs(5),
        );
        assert!(!output.success());
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn test_combined_prefers_both_streams() {
        let output = GitOutput {
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");

        let only_err = GitOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "err".to_string(),
        };
        assert_eq!(only_err.combined(), "err");
    }

    #[tokio::test]
    async fn test_run_async_captures_stdout() {
        let output = run_async(Path::new("."), &["--version"], Duration::from_secs(5)).await;
        assert!(output.success());
        assert!(output.stdout.starts_with("git version"));
    }

    #[test]
    fn test_check_git_available() {
        // git is a test prerequisite for this whole suite
        assert!(check_git_available());
    }
}
