//! Repository browsing across GitHub and GitLab.
//!
//! [`VcsConnector`] is the process-wide entry point. Each request opens a
//! [`RepoSource`] for one repository URL and one caller; every data call on
//! it re-checks visibility upstream and refuses private repositories to
//! callers without a plan.

mod error;
pub mod github;
pub mod gitlab;
mod http;
mod url;

pub use error::VcsError;
pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use http::build_client;
pub use url::{Provider, RepoLocation, parse_repo_url};

use crate::config::ProviderConfig;
use crate::types::UserIdentity;

/// Paths in a repository tree. `truncated` is set when the provider cut the
/// listing short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    pub paths: Vec<String>,
    pub truncated: bool,
}

/// Refuses private data to callers without a plan. Any plan qualifies;
/// plan tiers only matter for record quotas.
pub fn check_private_access(is_private: bool, has_plan: bool) -> Result<(), VcsError> {
    if is_private && !has_plan {
        return Err(VcsError::PlanRequired);
    }
    Ok(())
}

/// Shared HTTP client plus the upstream endpoints. Cheap to clone.
#[derive(Clone)]
pub struct VcsConnector {
    http: reqwest::Client,
    github_api_url: String,
    gitlab_api_url: String,
}

impl VcsConnector {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_client(config)?,
            github_api_url: config.github_api_url.clone(),
            gitlab_api_url: config.gitlab_api_url.clone(),
        })
    }

    /// Opens `repo_url` on behalf of `identity`, using the caller's linked
    /// token for that provider or an anonymous client.
    pub fn open(
        &self,
        repo_url: &str,
        branch: Option<&str>,
        identity: &UserIdentity,
    ) -> Result<RepoSource, VcsError> {
        let location = parse_repo_url(repo_url, branch)?;
        let token = identity.access_token(location.provider).map(str::to_string);
        let has_plan = identity.has_plan();

        tracing::debug!(
            "Opening {} repository {} (authenticated: {})",
            location.provider,
            location.full_name(),
            token.is_some()
        );

        Ok(match location.provider {
            Provider::GitHub => RepoSource::GitHub(GitHubSource {
                client: GitHubClient::new(self.http.clone(), &self.github_api_url, token),
                location,
                has_plan,
            }),
            Provider::GitLab => RepoSource::GitLab(GitLabSource {
                client: GitLabClient::new(self.http.clone(), &self.gitlab_api_url, token),
                location,
                has_plan,
            }),
        })
    }
}

/// One repository, opened for one caller.
pub enum RepoSource {
    GitHub(GitHubSource),
    GitLab(GitLabSource),
}

impl RepoSource {
    #[must_use]
    pub fn location(&self) -> &RepoLocation {
        match self {
            RepoSource::GitHub(source) => &source.location,
            RepoSource::GitLab(source) => &source.location,
        }
    }

    pub async fn is_private(&self) -> Result<bool, VcsError> {
        match self {
            RepoSource::GitHub(source) => source.is_private().await,
            RepoSource::GitLab(source) => source.is_private().await,
        }
    }

    /// Every path in the repository's tree on the resolved branch.
    pub async fn list_files(&self) -> Result<FileListing, VcsError> {
        match self {
            RepoSource::GitHub(source) => source.list_files().await,
            RepoSource::GitLab(source) => source.list_files().await,
        }
    }

    /// The text of one file on the resolved branch.
    pub async fn get_file_content(&self, path: &str) -> Result<String, VcsError> {
        match self {
            RepoSource::GitHub(source) => source.get_file_content(path).await,
            RepoSource::GitLab(source) => source.get_file_content(path).await,
        }
    }

    pub async fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        match self {
            RepoSource::GitHub(source) => source.list_branches().await,
            RepoSource::GitLab(source) => source.list_branches().await,
        }
    }
}

fn decode_text(path: &str, bytes: Vec<u8>) -> Result<String, VcsError> {
    String::from_utf8(bytes).map_err(|_| VcsError::BinaryFile(path.to_string()))
}

pub struct GitHubSource {
    client: GitHubClient,
    location: RepoLocation,
    has_plan: bool,
}

impl GitHubSource {
    async fn repository(&self) -> Result<github::GitHubRepository, VcsError> {
        self.client
            .get_repository(&self.location.owner, &self.location.repo_name)
            .await
    }

    /// Fetches metadata and applies the private-access gate.
    async fn accessible_repository(&self) -> Result<github::GitHubRepository, VcsError> {
        let repo = self.repository().await?;
        check_private_access(repo.private, self.has_plan)?;
        Ok(repo)
    }

    fn resolve_branch(&self, repo: &github::GitHubRepository) -> Result<String, VcsError> {
        self.location
            .branch
            .clone()
            .or_else(|| repo.default_branch.clone())
            .ok_or(VcsError::EmptyRepository(Provider::GitHub))
    }

    pub async fn is_private(&self) -> Result<bool, VcsError> {
        Ok(self.repository().await?.private)
    }

    pub async fn list_files(&self) -> Result<FileListing, VcsError> {
        let repo = self.accessible_repository().await?;
        let branch = self.resolve_branch(&repo)?;
        let (owner, name) = (&self.location.owner, &self.location.repo_name);

        let tree_sha = self.client.get_branch_tree_sha(owner, name, &branch).await?;
        let listing = self.client.get_tree_paths(owner, name, &tree_sha).await?;
        if listing.paths.is_empty() {
            return Err(VcsError::EmptyRepository(Provider::GitHub));
        }

        tracing::info!(
            "Listed {} paths in {} at {branch}",
            listing.paths.len(),
            repo.full_name
        );
        Ok(listing)
    }

    pub async fn get_file_content(&self, path: &str) -> Result<String, VcsError> {
        let repo = self.accessible_repository().await?;
        let branch = self.resolve_branch(&repo)?;
        let bytes = self
            .client
            .get_file(&self.location.owner, &self.location.repo_name, path, &branch)
            .await?;
        decode_text(path, bytes)
    }

    pub async fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        self.accessible_repository().await?;
        self.client
            .list_branches(&self.location.owner, &self.location.repo_name)
            .await
    }
}

pub struct GitLabSource {
    client: GitLabClient,
    location: RepoLocation,
    has_plan: bool,
}

impl GitLabSource {
    async fn project(&self) -> Result<gitlab::GitLabProject, VcsError> {
        self.client.get_project(&self.location.full_name()).await
    }

    async fn accessible_project(&self) -> Result<gitlab::GitLabProject, VcsError> {
        let project = self.project().await?;
        check_private_access(project.is_private(), self.has_plan)?;
        Ok(project)
    }

    fn resolve_branch(&self, project: &gitlab::GitLabProject) -> Result<String, VcsError> {
        self.location
            .branch
            .clone()
            .or_else(|| project.default_branch.clone())
            .ok_or(VcsError::EmptyRepository(Provider::GitLab))
    }

    pub async fn is_private(&self) -> Result<bool, VcsError> {
        Ok(self.project().await?.is_private())
    }

    pub async fn list_files(&self) -> Result<FileListing, VcsError> {
        let project = self.accessible_project().await?;
        if project.empty_repo {
            return Err(VcsError::EmptyRepository(Provider::GitLab));
        }
        let branch = self.resolve_branch(&project)?;

        let paths = self
            .client
            .list_tree(&project.path_with_namespace, &branch)
            .await?;
        if paths.is_empty() {
            return Err(VcsError::EmptyRepository(Provider::GitLab));
        }

        tracing::info!(
            "Listed {} paths in {} at {branch}",
            paths.len(),
            project.path_with_namespace
        );
        Ok(FileListing {
            paths,
            truncated: false,
        })
    }

    pub async fn get_file_content(&self, path: &str) -> Result<String, VcsError> {
        let project = self.accessible_project().await?;
        let branch = self.resolve_branch(&project)?;
        let bytes = self
            .client
            .get_file(&project.path_with_namespace, path, &branch)
            .await?;
        decode_text(path, bytes)
    }

    pub async fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        let project = self.accessible_project().await?;
        self.client.list_branches(&project.path_with_namespace).await
    }
}
