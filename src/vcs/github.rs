//! GitHub REST v3 client covering the calls repository browsing needs.

use reqwest::{Client, RequestBuilder, StatusCode, header::ACCEPT};
use serde::Deserialize;
use serde_json::Value;

use super::http::{decode_base64, encode_path, read_json, transport_error, upstream_error};
use super::{FileListing, Provider, VcsError};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";
const BRANCHES_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchDetail {
    commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
struct BranchCommit {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    tree: ShaRef,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitTree {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct BranchName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FileContents {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// One user's view of the GitHub API. Without a token the client is
/// anonymous: public data only, at the lower upstream rate limit.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    #[must_use]
    pub fn new(http: Client, api_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn get(&self, path: &str, accept: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("GitHub GET {url}");
        let request = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, VcsError> {
        request
            .send()
            .await
            .map_err(|e| transport_error(Provider::GitHub, e))
    }

    /// Fetches repository metadata. A 404 here means the repository does
    /// not exist or is hidden from this caller.
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepository, VcsError> {
        let response = self
            .send(self.get(&format!("/repos/{owner}/{repo}"), JSON_MEDIA_TYPE))
            .await?;
        read_json(Provider::GitHub, response, |status| {
            (status == StatusCode::NOT_FOUND).then_some(VcsError::RepositoryNotFound)
        })
        .await
    }

    /// Resolves a branch to the sha of its commit's root tree.
    pub async fn get_branch_tree_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, VcsError> {
        let path = format!("/repos/{owner}/{repo}/branches/{}", encode_path(branch));
        let response = self.send(self.get(&path, JSON_MEDIA_TYPE)).await?;
        let detail: BranchDetail = read_json(Provider::GitHub, response, |status| match status {
            StatusCode::NOT_FOUND => Some(VcsError::BranchNotFound(branch.to_string())),
            StatusCode::CONFLICT => Some(VcsError::EmptyRepository(Provider::GitHub)),
            _ => None,
        })
        .await?;
        Ok(detail.commit.commit.tree.sha)
    }

    /// Lists every path under a tree, recursively. GitHub caps recursive
    /// trees; the listing says when it was cut short.
    pub async fn get_tree_paths(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
    ) -> Result<FileListing, VcsError> {
        let path = format!("/repos/{owner}/{repo}/git/trees/{tree_sha}");
        let response = self
            .send(self.get(&path, JSON_MEDIA_TYPE).query(&[("recursive", "1")]))
            .await?;
        let tree: GitTree = read_json(Provider::GitHub, response, |status| {
            (status == StatusCode::CONFLICT).then_some(VcsError::EmptyRepository(Provider::GitHub))
        })
        .await?;
        if tree.truncated {
            tracing::warn!("GitHub truncated the tree listing for {owner}/{repo}");
        }
        Ok(FileListing {
            paths: tree.tree.into_iter().map(|entry| entry.path).collect(),
            truncated: tree.truncated,
        })
    }

    /// Downloads a file's bytes at `reference`.
    pub async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
        reference: &str,
    ) -> Result<Vec<u8>, VcsError> {
        let path = format!("/repos/{owner}/{repo}/contents/{}", encode_path(file_path));
        let not_found = |status: StatusCode| {
            (status == StatusCode::NOT_FOUND).then(|| VcsError::PathNotFound(file_path.to_string()))
        };

        let response = self
            .send(self.get(&path, JSON_MEDIA_TYPE).query(&[("ref", reference)]))
            .await?;
        let value: Value = read_json(Provider::GitHub, response, not_found).await?;
        if value.is_array() {
            return Err(VcsError::NotAFile(file_path.to_string()));
        }

        let contents: FileContents =
            serde_json::from_value(value).map_err(|e| VcsError::Provider {
                provider: Provider::GitHub,
                status: None,
                message: format!("unexpected contents payload: {e}"),
            })?;

        match (contents.encoding.as_deref(), contents.content) {
            (Some("base64"), Some(content)) if !content.is_empty() => {
                decode_base64(Provider::GitHub, &content)
            }
            _ => {
                // Large files come back without inline content.
                let response = self
                    .send(self.get(&path, RAW_MEDIA_TYPE).query(&[("ref", reference)]))
                    .await?;
                if !response.status().is_success() {
                    if let Some(err) = not_found(response.status()) {
                        return Err(err);
                    }
                    return Err(upstream_error(Provider::GitHub, response).await);
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| transport_error(Provider::GitHub, e))?;
                Ok(bytes.to_vec())
            }
        }
    }

    pub async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<String>, VcsError> {
        let response = self
            .send(
                self.get(&format!("/repos/{owner}/{repo}/branches"), JSON_MEDIA_TYPE)
                    .query(&[("per_page", BRANCHES_PER_PAGE)]),
            )
            .await?;
        let branches: Vec<BranchName> = read_json(Provider::GitHub, response, |status| {
            (status == StatusCode::NOT_FOUND).then_some(VcsError::RepositoryNotFound)
        })
        .await?;
        if branches.len() >= BRANCHES_PER_PAGE {
            tracing::warn!(
                "{owner}/{repo} has at least {BRANCHES_PER_PAGE} branches; only the first page was listed"
            );
        }
        Ok(branches.into_iter().map(|b| b.name).collect())
    }
}
