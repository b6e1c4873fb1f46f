//! Git command execution wrappers.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when running git commands.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be found or spawned.
    #[error("failed to execute git")]
    SpawnError(#[from] std::io::Error),

    /// The git command exited with a non-zero status.
    #[error("git {command} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// The subcommand that failed, e.g. `clone`.
        command: String,
        /// The exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// The content of stderr.
        stderr: String,
    },
}

/// A specialized `Result` type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Execute a `git` command with the given arguments and working directory.
///
/// Returns the trimmed contents of stdout on success.
///
/// # Errors
///
/// Returns [`GitError::SpawnError`] if `git` cannot be found, or
/// [`GitError::CommandFailed`] if the command exits with a non-zero status.
pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    tracing::debug!(?args, cwd = %cwd.display(), "git");
    let output = Command::new("git").args(args).current_dir(cwd).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::CommandFailed {
            command: subcommand(args),
            code: output.status.code(),
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(stdout)
}

/// First non-option argument, used to label failures.
fn subcommand(args: &[&str]) -> String {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            // options that take a value
            "-C" | "-c" => {
                iter.next();
            }
            a if a.starts_with('-') => {}
            a => return a.to_string(),
        }
    }
    String::new()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
