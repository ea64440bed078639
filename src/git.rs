//! Git process execution.
//!
//! Thin wrappers over the local `git` binary: repository probing, remote
//! listing, and the primitives the checkout executor sequences (remote
//! upsert, fetch, branch creation and reset). Each function runs one git
//! command and maps failure onto [`GitError`] with enough context to
//! diagnose.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Result of an idempotent remote upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteUpsert {
    Added,
    Updated,
}

/// Run a git command in `dir` and return trimmed stdout.
fn run(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    debug!(args = %args.join(" "), dir = %dir.display(), "git:run");
    let output = Command::new("git").args(args).current_dir(dir).output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(GitError::CommandFailed {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a git command in `dir`, reporting only whether it succeeded.
fn run_check(dir: &Path, args: &[&str]) -> Result<bool, GitError> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    Ok(output.status.success())
}

/// Repository-root probe: the top level of the working tree containing
/// `path`, or [`GitError::NotARepository`] if there is none.
pub fn repo_root(path: &Path) -> Result<PathBuf, GitError> {
    run(path, &["rev-parse", "--show-toplevel"])
        .map(PathBuf::from)
        .map_err(|err| match err {
            GitError::CommandFailed { .. } => GitError::NotARepository {
                path: path.display().to_string(),
            },
            other => other,
        })
}

/// Raw `git remote -v` output, one `name\turl (direction)` line per entry.
pub fn list_remotes_verbose(root: &Path) -> Result<String, GitError> {
    run(root, &["remote", "-v"])
}

/// The configured URL of `remote`, or `None` if no such remote exists.
pub fn remote_url(root: &Path, remote: &str) -> Result<Option<String>, GitError> {
    // "no such remote" is an expected outcome here, not a failure.
    match run(root, &["remote", "get-url", remote]) {
        Ok(url) => Ok(Some(url)),
        Err(GitError::CommandFailed { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Register `remote` pointing at `url`, updating the URL if the remote
/// already exists. Calling this twice with the same arguments never fails.
pub fn ensure_remote(root: &Path, remote: &str, url: &str) -> Result<RemoteUpsert, GitError> {
    if remote_url(root, remote)?.is_some() {
        run(root, &["remote", "set-url", remote, url])?;
        Ok(RemoteUpsert::Updated)
    } else {
        run(root, &["remote", "add", remote, url])?;
        Ok(RemoteUpsert::Added)
    }
}

/// Fetch `refspec` from `remote`.
pub fn fetch(root: &Path, remote: &str, refspec: &str) -> Result<(), GitError> {
    run(root, &["fetch", remote, refspec]).map(|_| ())
}

/// Whether a local branch named `branch` exists.
pub fn branch_exists(root: &Path, branch: &str) -> Result<bool, GitError> {
    run_check(
        root,
        &[
            "show-ref",
            "--verify",
            "--quiet",
            &format!("refs/heads/{}", branch),
        ],
    )
}

/// Create `branch` tracking `remote/fetch_ref` and check it out.
pub fn create_tracking_branch(
    root: &Path,
    branch: &str,
    remote: &str,
    fetch_ref: &str,
) -> Result<(), GitError> {
    let upstream = format!("{}/{}", remote, fetch_ref);
    run(root, &["checkout", "-b", branch, "--track", &upstream]).map(|_| ())
}

/// Check out an existing local branch.
pub fn checkout_branch(root: &Path, branch: &str) -> Result<(), GitError> {
    run(root, &["checkout", branch]).map(|_| ())
}

/// Hard-reset the current branch to `remote/fetch_ref`. Discards local
/// commits on that branch; callers gate this behind an explicit
/// acknowledgment.
pub fn reset_hard_to(root: &Path, remote: &str, fetch_ref: &str) -> Result<(), GitError> {
    let target = format!("{}/{}", remote, fetch_ref);
    run(root, &["reset", "--hard", &target]).map(|_| ())
}
