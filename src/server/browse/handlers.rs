use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::dto::{
    BranchesResponse, FileContentResponse, FileData, RepoData, RepoFilesResponse,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::validate_repo_url;
use crate::vcs::RepoSource;

fn open(state: &AppState, auth: &RequireUser, repo_url: &str, branch: Option<&str>) -> Result<RepoSource, ApiError> {
    validate_repo_url(repo_url)?;
    let branch = branch.filter(|b| !b.trim().is_empty());
    Ok(state.vcs.open(repo_url, branch, &auth.identity)?)
}

pub async fn get_repo_files(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RepoData>,
) -> impl IntoResponse {
    let source = open(&state, &auth, &req.repo_url, req.branch.as_deref())?;
    let listing = source.list_files().await?;
    let repo = source.location().full_name();

    state.record_message(
        &auth.identity.id,
        format!("Listed {} files in {repo}", listing.paths.len()),
    );

    Ok::<_, ApiError>(Json(ApiResponse::success(RepoFilesResponse {
        repo,
        branch: source.location().branch.clone(),
        files: listing.paths,
        truncated: listing.truncated,
    })))
}

pub async fn get_file_content(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<FileData>,
) -> impl IntoResponse {
    let source = open(&state, &auth, &req.repo_url, req.branch.as_deref())?;

    // A blob link already names the file; an explicit path wins.
    let path = Some(req.path.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or_else(|| source.location().file_path.clone())
        .ok_or_else(|| ApiError::bad_request("path cannot be empty"))?;

    let content = source.get_file_content(&path).await?;
    let repo = source.location().full_name();

    state.record_message(&auth.identity.id, format!("Fetched {path} from {repo}"));

    Ok::<_, ApiError>(Json(ApiResponse::success(FileContentResponse {
        repo,
        path,
        content,
    })))
}

pub async fn list_branches(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RepoData>,
) -> impl IntoResponse {
    branches(&state, &auth, &req).await
}

pub async fn list_branches_query(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiQuery(req): ApiQuery<RepoData>,
) -> impl IntoResponse {
    branches(&state, &auth, &req).await
}

async fn branches(
    state: &AppState,
    auth: &RequireUser,
    req: &RepoData,
) -> Result<Json<ApiResponse<BranchesResponse>>, ApiError> {
    let source = open(state, auth, &req.repo_url, req.branch.as_deref())?;
    let branches = source.list_branches().await?;
    let repo = source.location().full_name();

    state.record_message(
        &auth.identity.id,
        format!("Listed {} branches of {repo}", branches.len()),
    );

    Ok(Json(ApiResponse::success(BranchesResponse { repo, branches })))
}
