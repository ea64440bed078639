//! Checkout planning for pull requests.
//!
//! Turns a pull-request descriptor plus the local repository's resolved
//! identity into a [`CheckoutPlan`]: which remote to fetch from, whether a
//! dedicated fork remote must be registered, and what local branch to
//! create or update. Pure decision logic; the git execution that realizes a
//! plan lives in `crate::workflow::checkout`.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::remote::{RepositoryIdentity, ResolvedRemote};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(
        "PR #{number} comes from a fork with no accessible clone URL \
         (the source repository may have been deleted)"
    )]
    MissingForkCloneUrl { number: u32 },

    #[error("PR #{number} has no head owner login; cannot derive a github-style branch name")]
    MissingForkOwner { number: u32 },
}

/// Local branch naming convention for checked-out pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
    /// `headRef` for same-repo PRs, `pr-{number}-{headRef}` for forks.
    #[default]
    Standard,
    /// Mirror the GitHub CLI's fork display convention: `owner:branch`.
    Github,
}

/// The minimal pull-request metadata needed to plan a checkout.
#[derive(Debug, Clone)]
pub struct PullRequestRef {
    pub number: u32,
    pub head_ref: String,
    pub head_repo_full_name: Option<String>,
    pub head_clone_url: Option<String>,
    pub head_owner_login: Option<String>,
    pub base: RepositoryIdentity,
}

/// Declared intent for a checkout; consumed by the executor.
///
/// `remote_url` is `Some` iff `is_fork`: fork PRs need a dedicated remote
/// registered (or updated), same-repo PRs reuse the already-configured
/// remote and need no URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub is_fork: bool,
    pub remote_name: String,
    pub remote_url: Option<String>,
    pub local_branch: String,
    pub fetch_ref: String,
}

/// Plan the checkout of `pr` into the repository identified by `resolved`.
///
/// Fork classification compares the PR's head repository against the local
/// identity's `owner/repo` form only; a PR whose *base* differs from the
/// local repository still plans normally.
pub fn plan_checkout(
    pr: &PullRequestRef,
    resolved: &ResolvedRemote,
    mode: NamingMode,
) -> Result<CheckoutPlan, PlanError> {
    // The PR normally belongs to the open repository. A differing base is
    // noted but does not abort: fork classification depends only on the
    // head repository.
    if pr.base != resolved.identity {
        debug!(base = %pr.base, local = %resolved.identity, "plan:base differs from local repository");
    }

    let same_repo = pr.head_repo_full_name.as_deref() == Some(resolved.identity.full_name().as_str());

    if same_repo {
        // Both naming modes agree for same-repo PRs: no fork-owner prefix
        // is needed, the branch keeps its upstream name.
        return Ok(CheckoutPlan {
            is_fork: false,
            remote_name: resolved.remote.clone(),
            remote_url: None,
            local_branch: pr.head_ref.clone(),
            fetch_ref: pr.head_ref.clone(),
        });
    }

    let remote_url = pr
        .head_clone_url
        .clone()
        .ok_or(PlanError::MissingForkCloneUrl { number: pr.number })?;

    let local_branch = match mode {
        NamingMode::Standard => format!("pr-{}-{}", pr.number, pr.head_ref),
        NamingMode::Github => {
            let owner = pr
                .head_owner_login
                .as_deref()
                .ok_or(PlanError::MissingForkOwner { number: pr.number })?;
            format!("{}:{}", owner, pr.head_ref)
        }
    };

    Ok(CheckoutPlan {
        is_fork: true,
        remote_name: format!("pr-{}", pr.number),
        remote_url: Some(remote_url),
        local_branch,
        fetch_ref: pr.head_ref.clone(),
    })
}
