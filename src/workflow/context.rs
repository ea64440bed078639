//! Shared context for workflow operations.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::remote::ResolvedRemote;
use crate::{git, remote};

/// Everything a workflow needs about the repository it operates on: the
/// loaded configuration, the working-tree root, and the resolved GitHub
/// identity. Built once per command.
pub struct WorkflowContext {
    pub config: Config,
    pub repo_root: PathBuf,
    pub resolved: ResolvedRemote,
}

impl WorkflowContext {
    pub fn at(config: Config, path: &Path) -> Result<Self> {
        // The repository probe runs first: "not a repository" must be
        // reported without inspecting remotes.
        let repo_root = git::repo_root(path)?;
        let raw = git::list_remotes_verbose(&repo_root)?;
        let resolved = remote::resolve_from_output(&raw).with_context(|| {
            format!(
                "Could not determine the GitHub repository for {}",
                repo_root.display()
            )
        })?;
        Ok(Self {
            config,
            repo_root,
            resolved,
        })
    }
}

// At most one checkout/fetch sequence may run at a time per workspace;
// interleaved git index mutation is not recoverable.
static ACTIVE_CHECKOUTS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

/// Single-flight token for a checkout sequence, keyed by workspace path.
/// Released on drop.
pub struct CheckoutGuard {
    workspace: PathBuf,
}

impl CheckoutGuard {
    /// Acquire the token for `workspace`, or `None` if a checkout is
    /// already running there.
    pub fn acquire(workspace: &Path) -> Option<Self> {
        let key = workspace
            .canonicalize()
            .unwrap_or_else(|_| workspace.to_path_buf());
        let mut active = ACTIVE_CHECKOUTS
            .get_or_init(|| Mutex::new(HashSet::new()))
            .lock()
            .expect("checkout registry poisoned");
        if !active.insert(key.clone()) {
            return None;
        }
        Some(Self { workspace: key })
    }
}

impl Drop for CheckoutGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = ACTIVE_CHECKOUTS
            .get_or_init(|| Mutex::new(HashSet::new()))
            .lock()
        {
            active.remove(&self.workspace);
        }
    }
}
