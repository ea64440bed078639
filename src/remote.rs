//! Repository identity resolution from git remote configuration.
//!
//! Parses the output of `git remote -v` and derives the canonical
//! `(owner, repo)` pair for the GitHub repository the working copy points
//! at. Pure text classification; the process execution that produces the
//! remote listing lives in `crate::git`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no GitHub remote found among the repository's fetch remotes")]
    NoGitHubRemote,
}

/// Which direction a remote line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Fetch,
    Push,
}

/// One parsed line of `git remote -v` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub name: String,
    pub url: String,
    pub direction: Direction,
}

/// Canonical identity of a GitHub-hosted repository.
///
/// Equality is case-sensitive on both fields. Both fields are non-empty
/// whenever resolution succeeds; failure is a [`ResolveError`], never an
/// empty placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub repo: String,
}

impl RepositoryIdentity {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// The `owner/repo` form used by the GitHub API and for fork
    /// classification.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A resolved identity together with the remote it was derived from.
///
/// The remote name is what the checkout planner reuses for same-repo pull
/// requests, so callers get "origin" in the common case but whatever remote
/// actually matched otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRemote {
    pub remote: String,
    pub identity: RepositoryIdentity,
}

// github.com host (case-insensitive) followed by :owner/repo or /owner/repo,
// with an optional trailing .git.
static GITHUB_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:github\.com)[:/]([^/]+?)/([^/]+?)(?:\.git)?$").unwrap());

// [user@]alias:segment/repo[.git], the scp-like shape produced by a
// personal SSH host alias. The alias is validated separately.
static SSH_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^@/]+@)?([^:/]+):([^/]+)/([^/]+?)(?:\.git)?$").unwrap());

/// Parse raw `git remote -v` output into records.
///
/// Lines that do not follow the `name\turl (fetch|push)` shape are skipped.
pub fn parse_remote_lines(raw: &str) -> Vec<RemoteRecord> {
    raw.lines()
        .filter_map(|line| {
            let (name, rest) = line.split_once('\t')?;
            let (url, direction) = rest.rsplit_once(' ')?;
            let direction = match direction {
                "(fetch)" => Direction::Fetch,
                "(push)" => Direction::Push,
                _ => return None,
            };
            Some(RemoteRecord {
                name: name.to_string(),
                url: url.trim().to_string(),
                direction,
            })
        })
        .collect()
}

/// Resolve the repository identity from parsed remote records.
///
/// Remotes are scanned in listed order and the first match wins; `origin`
/// gets no special treatment beyond its position in the list. Only fetch
/// remotes are considered. Per remote, a direct `github.com` URL match is
/// preferred over the SSH-alias interpretation.
pub fn resolve(records: &[RemoteRecord]) -> Result<ResolvedRemote, ResolveError> {
    for record in records {
        if record.direction != Direction::Fetch {
            continue;
        }
        if let Some(identity) = match_github_host(&record.url).or_else(|| match_ssh_alias(&record.url))
        {
            return Ok(ResolvedRemote {
                remote: record.name.clone(),
                identity,
            });
        }
    }
    Err(ResolveError::NoGitHubRemote)
}

/// Convenience for callers holding the raw listing text.
pub fn resolve_from_output(raw: &str) -> Result<ResolvedRemote, ResolveError> {
    resolve(&parse_remote_lines(raw))
}

fn match_github_host(url: &str) -> Option<RepositoryIdentity> {
    let caps = GITHUB_HOST.captures(url)?;
    Some(RepositoryIdentity::new(&caps[1], &caps[2]))
}

/// Interpret a URL as a personal SSH alias for github.com.
///
/// The alias must not contain a dot (real hostnames do) and must not
/// contain the literal substrings "gitlab" or "bitbucket". The owner is the
/// last colon-delimited token of the middle segment, which supports
/// `alias:owner/repo`-style SSH configuration. This heuristic is known to
/// be imperfect for enterprise hosts and is kept as-is.
fn match_ssh_alias(url: &str) -> Option<RepositoryIdentity> {
    let caps = SSH_ALIAS.captures(url)?;
    let alias = &caps[1];
    if alias.contains('.') || alias.contains("gitlab") || alias.contains("bitbucket") {
        return None;
    }
    let owner = caps[2].rsplit(':').next().unwrap_or(&caps[2]);
    if owner.is_empty() {
        return None;
    }
    Some(RepositoryIdentity::new(owner, &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_one(line: &str) -> Result<ResolvedRemote, ResolveError> {
        resolve_from_output(line)
    }

    #[test]
    fn parses_fetch_and_push_lines() {
        let raw = "origin\tgit@github.com:acme/widgets.git (fetch)\n\
                   origin\tgit@github.com:acme/widgets.git (push)\n";
        let records = parse_remote_lines(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "origin");
        assert_eq!(records[0].direction, Direction::Fetch);
        assert_eq!(records[1].direction, Direction::Push);
    }

    #[test]
    fn skips_malformed_lines() {
        let raw = "garbage line\norigin\tgit@github.com:acme/widgets.git (fetch)\n";
        assert_eq!(parse_remote_lines(raw).len(), 1);
    }

    #[test]
    fn resolves_https_url() {
        let resolved =
            resolve_one("origin\thttps://github.com/acme/widgets.git (fetch)").unwrap();
        assert_eq!(resolved.remote, "origin");
        assert_eq!(resolved.identity, RepositoryIdentity::new("acme", "widgets"));
    }

    #[test]
    fn resolves_ssh_url_and_strips_git_suffix() {
        let resolved = resolve_one("origin\tgit@github.com:acme/widgets.git (fetch)").unwrap();
        assert_eq!(resolved.identity, RepositoryIdentity::new("acme", "widgets"));
    }

    #[test]
    fn resolves_url_without_git_suffix() {
        let resolved = resolve_one("origin\thttps://github.com/acme/widgets (fetch)").unwrap();
        assert_eq!(resolved.identity, RepositoryIdentity::new("acme", "widgets"));
    }

    #[test]
    fn github_host_match_is_case_insensitive_on_host_only() {
        let resolved = resolve_one("origin\thttps://GitHub.COM/Acme/Widgets.git (fetch)").unwrap();
        // Host matching folds case; captures stay verbatim.
        assert_eq!(resolved.identity, RepositoryIdentity::new("Acme", "Widgets"));
    }

    #[test]
    fn resolves_personal_ssh_alias() {
        let resolved = resolve_one("origin\tgit@my-alias:octocat/Hello-World.git (fetch)").unwrap();
        assert_eq!(
            resolved.identity,
            RepositoryIdentity::new("octocat", "Hello-World")
        );
    }

    #[test]
    fn resolves_alias_with_colon_segment() {
        // alias:owner/repo-style SSH config: owner is the last colon token.
        let resolved = resolve_one("origin\tgit@work:octocat/Hello-World.git (fetch)").unwrap();
        assert_eq!(resolved.identity.owner, "octocat");

        let resolved = resolve_one("origin\tci@my-alias:team:octocat/repo (fetch)").unwrap();
        assert_eq!(resolved.identity, RepositoryIdentity::new("octocat", "repo"));
    }

    #[test]
    fn rejects_gitlab_remote() {
        let err = resolve_one("origin\tgit@gitlab.com:foo/bar.git (fetch)").unwrap_err();
        assert!(matches!(err, ResolveError::NoGitHubRemote));
    }

    #[test]
    fn rejects_gitlab_alias_without_dot() {
        let err = resolve_one("origin\tgit@gitlab-internal:foo/bar.git (fetch)").unwrap_err();
        assert!(matches!(err, ResolveError::NoGitHubRemote));
    }

    #[test]
    fn rejects_bitbucket_and_dotted_aliases() {
        assert!(resolve_one("origin\tgit@bitbucket-work:foo/bar.git (fetch)").is_err());
        assert!(resolve_one("origin\tgit@some.host:foo/bar.git (fetch)").is_err());
    }

    #[test]
    fn ignores_push_only_remotes() {
        let err = resolve_one("mirror\tgit@github.com:acme/widgets.git (push)").unwrap_err();
        assert!(matches!(err, ResolveError::NoGitHubRemote));
    }

    #[test]
    fn first_matching_remote_wins_in_listed_order() {
        let raw = "fork\tgit@github.com:contributor/widgets.git (fetch)\n\
                   origin\tgit@github.com:acme/widgets.git (fetch)\n";
        let resolved = resolve_from_output(raw).unwrap();
        assert_eq!(resolved.remote, "fork");
        assert_eq!(resolved.identity.owner, "contributor");
    }

    #[test]
    fn alias_match_on_earlier_remote_beats_host_match_on_later() {
        let raw = "personal\tgit@my-alias:octocat/widgets.git (fetch)\n\
                   origin\tgit@github.com:acme/widgets.git (fetch)\n";
        let resolved = resolve_from_output(raw).unwrap();
        assert_eq!(resolved.remote, "personal");
        assert_eq!(resolved.identity.owner, "octocat");
    }

    #[test]
    fn plain_https_non_github_does_not_match_alias_pattern() {
        assert!(resolve_one("origin\thttps://example.com/foo/bar.git (fetch)").is_err());
    }

    #[test]
    fn empty_listing_fails() {
        assert!(resolve_from_output("").is_err());
    }
}
