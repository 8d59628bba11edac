use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::VcsError;

/// Path segments that separate a repository from a branch/path suffix.
/// Order matters: the first marker present wins.
const PATH_MARKERS: [&str; 9] = [
    "tree",
    "blob",
    "wiki",
    "pull",
    "issues",
    "actions",
    "projects",
    "discussions",
    "settings",
];

/// GitLab puts this separator between the project path and its sub-pages.
const GITLAB_SEPARATOR: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    GitLab,
}

impl Provider {
    /// Picks the provider from the host named in a repository URL.
    pub fn from_url(url: &str) -> Result<Self, VcsError> {
        if url.contains("github.com") {
            Ok(Provider::GitHub)
        } else if url.contains("gitlab.com") {
            Ok(Provider::GitLab)
        } else {
            Err(VcsError::UnsupportedProvider(url.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::GitHub => f.write_str("GitHub"),
            Provider::GitLab => f.write_str("GitLab"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "gitlab" => Ok(Provider::GitLab),
            other => Err(format!("unknown provider '{other}' (expected github or gitlab)")),
        }
    }
}

/// Where a repository URL points. `branch` is `None` when neither the URL
/// nor the caller named one; the provider's default branch applies then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub provider: Provider,
    pub owner: String,
    pub repo_name: String,
    pub branch: Option<String>,
    pub file_path: Option<String>,
}

impl RepoLocation {
    /// `owner/repo`, the form both providers use to address a repository.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo_name)
    }
}

/// Parses a repository URL into a [`RepoLocation`].
///
/// Accepts `https://host/owner/repo`, deep links such as
/// `https://host/owner/repo/tree/<branch>/<path>`, GitLab's `/-/` form,
/// `git@host:owner/repo.git`, and scheme-less `host/owner/repo`. A branch
/// found in the URL takes precedence over `branch`.
pub fn parse_repo_url(url: &str, branch: Option<&str>) -> Result<RepoLocation, VcsError> {
    let provider = Provider::from_url(url)?;
    let invalid = || VcsError::InvalidUrl(url.to_string());

    let trimmed = url.trim();
    let trimmed = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed);

    let (path, leading_host) = if let Some((_, rest)) = trimmed.split_once("://") {
        (rest.split_once('/').map_or("", |(_, path)| path), false)
    } else if let Some(rest) = trimmed.strip_prefix("git@") {
        (rest.split_once(':').map_or("", |(_, path)| path), false)
    } else {
        (trimmed, true)
    };

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if leading_host && !segments.is_empty() {
        segments.remove(0);
    }

    let boundary = segments
        .iter()
        .enumerate()
        .skip(2)
        .find(|(_, s)| **s == GITLAB_SEPARATOR || PATH_MARKERS.contains(*s))
        .map_or(segments.len(), |(i, _)| i);

    if boundary < 2 {
        return Err(invalid());
    }

    let owner = segments[..boundary - 1].join("/");
    let raw_name = segments[boundary - 1];
    let repo_name = raw_name.strip_suffix(".git").unwrap_or(raw_name).to_string();

    if owner.is_empty() || repo_name.is_empty() {
        return Err(invalid());
    }

    let rest = &segments[boundary..];
    let marker_hit = PATH_MARKERS
        .iter()
        .find_map(|marker| rest.iter().position(|s| s == marker));

    let (branch, file_path) = match marker_hit {
        Some(i) => {
            let branch = rest.get(i + 1).map(|s| (*s).to_string());
            let file_path = rest.get(i + 2..).map(|p| p.join("/")).filter(|p| !p.is_empty());
            (branch, file_path)
        }
        None => (branch.map(str::to_string), None),
    };

    Ok(RepoLocation {
        provider,
        owner,
        repo_name,
        branch,
        file_path,
    })
}
