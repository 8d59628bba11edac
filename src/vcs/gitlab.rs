//! GitLab REST v4 client covering the calls repository browsing needs.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use super::http::{decode_base64, read_json, transport_error};
use super::{Provider, VcsError};

const PER_PAGE: &str = "100";
const BRANCHES_PER_PAGE: usize = 100;
const NEXT_PAGE_HEADER: &str = "x-next-page";

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabProject {
    pub path_with_namespace: String,
    /// Absent on some anonymous responses; anything an anonymous caller can
    /// read is public.
    #[serde(default)]
    pub visibility: Option<String>,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub empty_repo: bool,
}

impl GitLabProject {
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility.as_deref() == Some("private")
    }
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
}

#[derive(Debug, Deserialize)]
struct BranchName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryFile {
    content: String,
    encoding: String,
}

/// One user's view of the GitLab API, anonymous when no token is linked.
#[derive(Clone)]
pub struct GitLabClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitLabClient {
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

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("GitLab GET {url}");
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, VcsError> {
        request
            .send()
            .await
            .map_err(|e| transport_error(Provider::GitLab, e))
    }

    /// GitLab addresses projects by their URL-encoded full path.
    fn project_path(project: &str) -> String {
        format!("/projects/{}", urlencoding::encode(project))
    }

    pub async fn get_project(&self, project: &str) -> Result<GitLabProject, VcsError> {
        let response = self.send(self.get(&Self::project_path(project))).await?;
        read_json(Provider::GitLab, response, |status| {
            (status == StatusCode::NOT_FOUND).then_some(VcsError::RepositoryNotFound)
        })
        .await
    }

    /// Lists every path in the repository at `reference`, following
    /// `x-next-page` until the last page.
    pub async fn list_tree(&self, project: &str, reference: &str) -> Result<Vec<String>, VcsError> {
        let path = format!("{}/repository/tree", Self::project_path(project));
        let mut paths = Vec::new();
        let mut page = "1".to_string();

        loop {
            let request = self.get(&path).query(&[
                ("recursive", "true"),
                ("ref", reference),
                ("per_page", PER_PAGE),
                ("page", page.as_str()),
            ]);
            let response = self.send(request).await?;
            let next_page = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let items: Vec<TreeItem> = read_json(Provider::GitLab, response, |status| {
                (status == StatusCode::NOT_FOUND)
                    .then(|| VcsError::BranchNotFound(reference.to_string()))
            })
            .await?;
            paths.extend(items.into_iter().map(|item| item.path));

            match next_page {
                Some(next) if next != page => page = next,
                _ => break,
            }
        }

        Ok(paths)
    }

    pub async fn get_file(&self, project: &str, file_path: &str, reference: &str) -> Result<Vec<u8>, VcsError> {
        let path = format!(
            "{}/repository/files/{}",
            Self::project_path(project),
            urlencoding::encode(file_path.trim_matches('/'))
        );
        let response = self
            .send(self.get(&path).query(&[("ref", reference)]))
            .await?;
        let file: RepositoryFile = read_json(Provider::GitLab, response, |status| {
            (status == StatusCode::NOT_FOUND).then(|| VcsError::PathNotFound(file_path.to_string()))
        })
        .await?;

        match file.encoding.as_str() {
            "base64" => decode_base64(Provider::GitLab, &file.content),
            _ => Ok(file.content.into_bytes()),
        }
    }

    pub async fn list_branches(&self, project: &str) -> Result<Vec<String>, VcsError> {
        let path = format!("{}/repository/branches", Self::project_path(project));
        let response = self
            .send(self.get(&path).query(&[("per_page", BRANCHES_PER_PAGE)]))
            .await?;
        let branches: Vec<BranchName> = read_json(Provider::GitLab, response, |status| {
            (status == StatusCode::NOT_FOUND).then_some(VcsError::RepositoryNotFound)
        })
        .await?;
        if branches.len() >= BRANCHES_PER_PAGE {
            tracing::warn!(
                "{project} has at least {BRANCHES_PER_PAGE} branches; only the first page was listed"
            );
        }
        Ok(branches.into_iter().map(|b| b.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path_encodes_subgroups() {
        assert_eq!(
            GitLabClient::project_path("acme/platform/widgets"),
            "/projects/acme%2Fplatform%2Fwidgets"
        );
    }

    #[test]
    fn test_visibility() {
        let project: GitLabProject = serde_json::from_str(
            r#"{"path_with_namespace":"a/b","visibility":"private","default_branch":"main"}"#,
        )
        .unwrap();
        assert!(project.is_private());

        let anonymous: GitLabProject =
            serde_json::from_str(r#"{"path_with_namespace":"a/b","default_branch":null}"#).unwrap();
        assert!(!anonymous.is_private());
        assert!(!anonymous.empty_repo);
    }
}
