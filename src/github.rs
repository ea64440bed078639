//! GitHub pull request lookup via the `gh` CLI.
//!
//! The GitHub API client is an external capability: `gh api` performs the
//! REST call and owns authentication, and this module only shapes the
//! request path, deserializes the response, and maps failures onto the
//! error taxonomy. The repository to query is always passed in explicitly;
//! nothing here keeps a client handle or touches credentials.

use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::plan::PullRequestRef;
use crate::remote::RepositoryIdentity;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub CLI (gh) not installed; install it from https://cli.github.com/")]
    GhNotInstalled,

    #[error("pull request #{number} not found in {repo}")]
    PullRequestNotFound { repo: String, number: u32 },

    #[error("GitHub CLI not authenticated; run `gh auth login`")]
    AuthRequired,

    #[error("GitHub API rate limit exceeded; wait a few minutes and retry")]
    RateLimited,

    #[error("failed to run gh: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("gh api failed: {0}")]
    Api(String),

    #[error("unexpected GitHub API response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Pull request metadata as returned by the REST pulls endpoint.
#[derive(Debug, Clone)]
pub struct PrDetails {
    pub number: u32,
    pub title: String,
    pub state: String,
    pub draft: bool,
    pub author: String,
    pub html_url: String,
    pub head_ref: String,
    pub head_repo_full_name: Option<String>,
    pub head_clone_url: Option<String>,
    pub head_owner_login: Option<String>,
    pub base_ref: String,
    pub base: RepositoryIdentity,
}

impl PrDetails {
    /// The slice of this metadata the checkout planner consumes.
    pub fn to_pull_request_ref(&self) -> PullRequestRef {
        PullRequestRef {
            number: self.number,
            head_ref: self.head_ref.clone(),
            head_repo_full_name: self.head_repo_full_name.clone(),
            head_clone_url: self.head_clone_url.clone(),
            head_owner_login: self.head_owner_login.clone(),
            base: self.base.clone(),
        }
    }
}

// Raw REST payload for `repos/{owner}/{repo}/pulls/{number}`. The head
// repo is null when the source repository has been deleted.
#[derive(Debug, Deserialize)]
struct PrResponse {
    number: u32,
    title: String,
    state: String,
    #[serde(default)]
    draft: bool,
    html_url: String,
    user: UserRef,
    head: BranchEnd,
    base: BranchEnd,
}

#[derive(Debug, Deserialize)]
struct BranchEnd {
    #[serde(rename = "ref")]
    ref_name: String,
    repo: Option<RepoRef>,
}

#[derive(Debug, Deserialize)]
struct RepoRef {
    full_name: String,
    clone_url: String,
    owner: UserRef,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

impl PrResponse {
    fn into_details(self, queried: &RepositoryIdentity) -> PrDetails {
        // The base repo is the one we queried; fall back to it if the
        // payload omits the base repo object.
        let base = self
            .base
            .repo
            .as_ref()
            .and_then(|repo| repo.full_name.split_once('/'))
            .map(|(owner, repo)| RepositoryIdentity::new(owner, repo))
            .unwrap_or_else(|| queried.clone());

        PrDetails {
            number: self.number,
            title: self.title,
            state: self.state,
            draft: self.draft,
            author: self.user.login,
            html_url: self.html_url,
            head_ref: self.head.ref_name,
            head_repo_full_name: self.head.repo.as_ref().map(|r| r.full_name.clone()),
            head_clone_url: self.head.repo.as_ref().map(|r| r.clone_url.clone()),
            head_owner_login: self.head.repo.map(|r| r.owner.login),
            base_ref: self.base.ref_name,
            base,
        }
    }
}

/// Fetch one pull request's metadata.
pub fn get_pr_details(repo: &RepositoryIdentity, number: u32) -> Result<PrDetails, GithubError> {
    let path = format!("repos/{}/{}/pulls/{}", repo.owner, repo.repo, number);
    let stdout = run_gh_api(&path, repo, Some(number))?;
    let response: PrResponse = serde_json::from_str(&stdout)?;
    Ok(response.into_details(repo))
}

/// List pull requests for a repository.
pub fn list_prs(
    repo: &RepositoryIdentity,
    state: &str,
    limit: u32,
) -> Result<Vec<PrDetails>, GithubError> {
    let path = format!(
        "repos/{}/{}/pulls?state={}&per_page={}",
        repo.owner, repo.repo, state, limit
    );
    let stdout = run_gh_api(&path, repo, None)?;
    let responses: Vec<PrResponse> = serde_json::from_str(&stdout)?;
    Ok(responses
        .into_iter()
        .map(|response| response.into_details(repo))
        .collect())
}

fn run_gh_api(
    path: &str,
    repo: &RepositoryIdentity,
    number: Option<u32>,
) -> Result<String, GithubError> {
    if which::which("gh").is_err() {
        return Err(GithubError::GhNotInstalled);
    }

    debug!(path, "github:gh api");
    let output = Command::new("gh")
        .args(["api", path])
        .env("GH_PROMPT_DISABLED", "1")
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_failure(&stderr, repo, number))
    }
}

/// Map gh stderr onto the error taxonomy. gh reports HTTP-level failures
/// as text, so this is substring matching by necessity.
fn classify_failure(
    stderr: &str,
    repo: &RepositoryIdentity,
    number: Option<u32>,
) -> GithubError {
    let lower = stderr.to_lowercase();

    if lower.contains("404") || lower.contains("not found") {
        if let Some(number) = number {
            return GithubError::PullRequestNotFound {
                repo: repo.full_name(),
                number,
            };
        }
    }
    if lower.contains("rate limit") || lower.contains("api rate") || lower.contains("403") {
        return GithubError::RateLimited;
    }
    if lower.contains("401")
        || lower.contains("authentication")
        || lower.contains("not logged")
        || lower.contains("auth login")
    {
        return GithubError::AuthRequired;
    }

    GithubError::Api(stderr.trim().to_string())
}
