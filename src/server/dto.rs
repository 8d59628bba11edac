use serde::{Deserialize, Serialize};

use crate::types::ContentPayload;

#[derive(Debug, Deserialize)]
pub struct RepoData {
    pub repo_url: String,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileData {
    pub repo_url: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepoFilesResponse {
    pub repo: String,
    pub branch: Option<String>,
    pub files: Vec<String>,
    /// The provider returned a partial tree.
    pub truncated: bool,
}

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub repo: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct BranchesResponse {
    pub repo: String,
    pub branches: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub referenced_repos: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub file_refs: Vec<String>,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub referenced_repos: Option<Vec<String>>,
    #[serde(default)]
    pub packages: Option<Vec<String>>,
    #[serde(default)]
    pub file_refs: Option<Vec<String>>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub content: Option<ContentPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub content: Option<ContentPayload>,
}

/// Acknowledgement for record mutations.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl StatusResponse {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            project_id: None,
            file_id: None,
        }
    }
}
