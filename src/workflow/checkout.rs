//! Checkout execution.
//!
//! Realizes a [`CheckoutPlan`] against the local repository as a fixed
//! sequence: ensure remote, fetch, make the branch ready. Any step's
//! failure aborts the sequence and names the step; a remote registered by
//! an earlier step is left in place (it is inert and reused on retry).

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::git::{self, GitError, RemoteUpsert};
use crate::plan::CheckoutPlan;

use super::context::CheckoutGuard;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("another checkout is already running for {workspace}")]
    InProgress { workspace: String },

    #[error("failed to register remote '{remote}' for PR #{number}: {source}")]
    RemoteUpsertFailed {
        number: u32,
        remote: String,
        source: GitError,
    },

    #[error("failed to fetch '{fetch_ref}' from '{remote}' for PR #{number}: {source}")]
    FetchFailed {
        number: u32,
        remote: String,
        fetch_ref: String,
        source: GitError,
    },

    /// Expected outcome, not a git failure: the branch exists and updating
    /// it discards local commits, so the caller must acknowledge first.
    #[error("local branch '{branch}' already exists and would be reset to {remote}/{fetch_ref}")]
    BranchNeedsReset {
        branch: String,
        remote: String,
        fetch_ref: String,
    },

    #[error("failed to check out branch '{branch}' for PR #{number}: {source}")]
    CheckoutFailed {
        number: u32,
        branch: String,
        source: GitError,
    },
}

/// Whether the caller has acknowledged that an existing local branch may be
/// hard-reset to the upstream ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Allow,
    Deny,
}

/// What the executor did, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub branch: String,
    pub remote: String,
    /// `Some` when the plan required a fork remote; records whether it was
    /// newly added or had its URL refreshed.
    pub remote_registered: Option<RemoteUpsert>,
    /// True when an existing branch was reset instead of created.
    pub reset_existing: bool,
}

/// Execute `plan` in the repository at `root`.
///
/// The PR branch is upstream-authoritative: when the local branch already
/// exists it is checked out and hard-reset to `remote/fetch_ref`, but only
/// with `Overwrite::Allow`; otherwise the executor stops with
/// [`CheckoutError::BranchNeedsReset`] before touching anything.
pub fn execute(
    root: &Path,
    plan: &CheckoutPlan,
    number: u32,
    overwrite: Overwrite,
) -> Result<CheckoutOutcome, CheckoutError> {
    let _guard = CheckoutGuard::acquire(root).ok_or_else(|| CheckoutError::InProgress {
        workspace: root.display().to_string(),
    })?;

    info!(
        number,
        remote = %plan.remote_name,
        branch = %plan.local_branch,
        is_fork = plan.is_fork,
        "checkout:start"
    );

    let remote_registered = match &plan.remote_url {
        Some(url) => Some(git::ensure_remote(root, &plan.remote_name, url).map_err(|source| {
            CheckoutError::RemoteUpsertFailed {
                number,
                remote: plan.remote_name.clone(),
                source,
            }
        })?),
        None => None,
    };
    info!(remote = %plan.remote_name, "checkout:remote-ensured");

    git::fetch(root, &plan.remote_name, &plan.fetch_ref).map_err(|source| {
        CheckoutError::FetchFailed {
            number,
            remote: plan.remote_name.clone(),
            fetch_ref: plan.fetch_ref.clone(),
            source,
        }
    })?;
    info!(remote = %plan.remote_name, fetch_ref = %plan.fetch_ref, "checkout:fetched");

    let exists = git::branch_exists(root, &plan.local_branch).map_err(|source| {
        CheckoutError::CheckoutFailed {
            number,
            branch: plan.local_branch.clone(),
            source,
        }
    })?;

    let reset_existing = if exists {
        if overwrite == Overwrite::Deny {
            return Err(CheckoutError::BranchNeedsReset {
                branch: plan.local_branch.clone(),
                remote: plan.remote_name.clone(),
                fetch_ref: plan.fetch_ref.clone(),
            });
        }
        git::checkout_branch(root, &plan.local_branch)
            .and_then(|_| git::reset_hard_to(root, &plan.remote_name, &plan.fetch_ref))
            .map_err(|source| CheckoutError::CheckoutFailed {
                number,
                branch: plan.local_branch.clone(),
                source,
            })?;
        true
    } else {
        git::create_tracking_branch(root, &plan.local_branch, &plan.remote_name, &plan.fetch_ref)
            .map_err(|source| CheckoutError::CheckoutFailed {
                number,
                branch: plan.local_branch.clone(),
                source,
            })?;
        false
    };
    info!(branch = %plan.local_branch, reset_existing, "checkout:branch-ready");

    Ok(CheckoutOutcome {
        branch: plan.local_branch.clone(),
        remote: plan.remote_name.clone(),
        remote_registered,
        reset_existing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("failed to spawn git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
        std::fs::write(dir.join(name), content).unwrap();
        git(dir, &["add", name]);
        git(
            dir,
            &[
                "-c",
                "user.name=test",
                "-c",
                "user.email=test@example.com",
                "commit",
                "--no-gpg-sign",
                "-qm",
                message,
            ],
        );
    }

    /// An upstream repository with `main` plus a `feature-x` branch.
    fn upstream_repo(dir: &Path) {
        git(dir, &["init", "--quiet"]);
        git(dir, &["checkout", "-qb", "main"]);
        commit_file(dir, "README", "base", "initial");
        git(dir, &["checkout", "-qb", "feature-x"]);
        commit_file(dir, "feature", "x", "feature work");
        git(dir, &["checkout", "-q", "main"]);
    }

    /// A local clone-alike: its own history plus `origin` pointing at
    /// `upstream` by path.
    fn local_repo(dir: &Path, upstream: &Path) {
        git(dir, &["init", "--quiet"]);
        git(dir, &["checkout", "-qb", "main"]);
        commit_file(dir, "README", "base", "initial");
        git(
            dir,
            &["remote", "add", "origin", upstream.to_str().unwrap()],
        );
    }

    fn same_repo_plan() -> CheckoutPlan {
        CheckoutPlan {
            is_fork: false,
            remote_name: "origin".to_string(),
            remote_url: None,
            local_branch: "feature-x".to_string(),
            fetch_ref: "feature-x".to_string(),
        }
    }

    fn fork_plan(fork: &Path) -> CheckoutPlan {
        CheckoutPlan {
            is_fork: true,
            remote_name: "pr-42".to_string(),
            remote_url: Some(fork.to_str().unwrap().to_string()),
            local_branch: "pr-42-feature-x".to_string(),
            fetch_ref: "feature-x".to_string(),
        }
    }

    struct Repos {
        _keep: Vec<tempfile::TempDir>,
        upstream: PathBuf,
        local: PathBuf,
    }

    fn setup() -> Repos {
        let upstream_dir = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        upstream_repo(upstream_dir.path());
        local_repo(local_dir.path(), upstream_dir.path());
        Repos {
            upstream: upstream_dir.path().to_path_buf(),
            local: local_dir.path().to_path_buf(),
            _keep: vec![upstream_dir, local_dir],
        }
    }

    #[test]
    fn same_repo_checkout_creates_a_tracking_branch() {
        let repos = setup();
        let outcome = execute(&repos.local, &same_repo_plan(), 7, Overwrite::Deny).unwrap();

        assert_eq!(outcome.branch, "feature-x");
        assert_eq!(outcome.remote_registered, None);
        assert!(!outcome.reset_existing);
        assert_eq!(git(&repos.local, &["branch", "--show-current"]), "feature-x");
        // Tracks the upstream tip.
        assert_eq!(
            git(&repos.local, &["rev-parse", "HEAD"]),
            git(&repos.upstream, &["rev-parse", "feature-x"])
        );
    }

    #[test]
    fn fork_checkout_registers_the_remote_and_prefixed_branch() {
        let repos = setup();
        let plan = fork_plan(&repos.upstream);
        let outcome = execute(&repos.local, &plan, 42, Overwrite::Deny).unwrap();

        assert_eq!(outcome.remote_registered, Some(RemoteUpsert::Added));
        assert_eq!(
            git(&repos.local, &["branch", "--show-current"]),
            "pr-42-feature-x"
        );
        assert_eq!(
            git(&repos.local, &["remote", "get-url", "pr-42"]),
            repos.upstream.to_str().unwrap()
        );
    }

    #[test]
    fn rerunning_a_fork_checkout_updates_instead_of_failing() {
        let repos = setup();
        let plan = fork_plan(&repos.upstream);
        execute(&repos.local, &plan, 42, Overwrite::Deny).unwrap();

        // Second run: remote exists, branch exists. With acknowledgment it
        // resets rather than erroring.
        let outcome = execute(&repos.local, &plan, 42, Overwrite::Allow).unwrap();
        assert_eq!(outcome.remote_registered, Some(RemoteUpsert::Updated));
        assert!(outcome.reset_existing);
    }

    #[test]
    fn existing_branch_requires_acknowledgment_before_reset() {
        let repos = setup();
        // Divergent local branch with the same name as the PR head.
        git(&repos.local, &["checkout", "-qb", "feature-x"]);
        commit_file(&repos.local, "local-only", "wip", "local work");
        git(&repos.local, &["checkout", "-q", "main"]);

        let before = git(&repos.local, &["rev-parse", "feature-x"]);
        let err = execute(&repos.local, &same_repo_plan(), 7, Overwrite::Deny).unwrap_err();
        assert!(matches!(err, CheckoutError::BranchNeedsReset { .. }));
        // Nothing was discarded.
        assert_eq!(git(&repos.local, &["rev-parse", "feature-x"]), before);
    }

    #[test]
    fn acknowledged_reset_makes_the_branch_upstream_authoritative() {
        let repos = setup();
        git(&repos.local, &["checkout", "-qb", "feature-x"]);
        commit_file(&repos.local, "local-only", "wip", "local work");
        git(&repos.local, &["checkout", "-q", "main"]);

        let outcome = execute(&repos.local, &same_repo_plan(), 7, Overwrite::Allow).unwrap();
        assert!(outcome.reset_existing);
        assert_eq!(
            git(&repos.local, &["rev-parse", "feature-x"]),
            git(&repos.upstream, &["rev-parse", "feature-x"])
        );
    }

    #[test]
    fn fetch_failure_names_the_step_and_keeps_the_remote() {
        let repos = setup();
        let mut plan = fork_plan(&repos.upstream);
        plan.fetch_ref = "no-such-branch".to_string();

        let err = execute(&repos.local, &plan, 42, Overwrite::Deny).unwrap_err();
        assert!(matches!(err, CheckoutError::FetchFailed { .. }));
        // No rollback: the registered remote stays for the retry.
        assert_eq!(
            git(&repos.local, &["remote", "get-url", "pr-42"]),
            repos.upstream.to_str().unwrap()
        );
    }

    #[test]
    fn concurrent_checkouts_for_one_workspace_are_rejected() {
        let repos = setup();
        let _guard = CheckoutGuard::acquire(&repos.local).unwrap();
        let err = execute(&repos.local, &same_repo_plan(), 7, Overwrite::Deny).unwrap_err();
        assert!(matches!(err, CheckoutError::InProgress { .. }));
    }
}
