use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use super::projects::owned_project;
use crate::auth::RequireUser;
use crate::quota::{QuotaError, RecordKind, require_parent};
use crate::server::AppState;
use crate::server::extract::ApiJson;
use crate::server::dto::{CreateFileRequest, StatusResponse, UpdateFileRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_file_name;
use crate::store::{FileAdmission, Store};
use crate::types::{FileContent, FileRecord, touch};

fn owned_file(store: &dyn Store, user_id: &str, file_id: &str) -> Result<FileRecord, ApiError> {
    store
        .get_file(file_id)
        .api_err("Failed to get file")?
        .filter(|f| f.owner_user_id == user_id)
        .or_not_found("File not found")
}

pub async fn create_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateFileRequest>,
) -> impl IntoResponse {
    let identity = &auth.identity;
    let store = state.store.as_ref();

    let project_id = require_parent(req.project_id.as_deref())?.to_string();
    validate_file_name(&req.name)?;
    owned_project(store, &identity.id, &project_id)?;

    let count = store
        .count_project_files(&project_id)
        .api_err("Failed to count files")?;
    let limit = state
        .plans
        .check_and_admit(RecordKind::File, identity.plan_id.as_deref(), count)?;

    let now = Utc::now();
    let file = FileRecord {
        file_id: Uuid::new_v4().to_string(),
        project_id,
        owner_user_id: identity.id.clone(),
        name: req.name,
        file_type: req.file_type,
        content: req.content.map(FileContent::from).unwrap_or_default(),
        created_at: now,
        last_active_at: now,
    };

    match store
        .create_file_capped(&file, limit)
        .api_err("Failed to create file")?
    {
        FileAdmission::Inserted => {}
        FileAdmission::LimitReached => {
            return Err(ApiError::from(QuotaError::QuotaExceeded {
                kind: RecordKind::File,
                limit,
            }));
        }
        FileAdmission::ParentMissing => return Err(ApiError::not_found("Project not found")),
    }

    tracing::info!("Created file {} in project {}", file.file_id, file.project_id);
    state.record_message(&identity.id, format!("File {} created.", file.file_id));

    let response = StatusResponse {
        file_id: Some(file.file_id),
        ..StatusResponse::success("File created!")
    };
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_user_files(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let files = state
        .store
        .list_user_files(&auth.identity.id)
        .api_err("Failed to list files")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(files)))
}

pub async fn list_project_files(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    owned_project(store, &auth.identity.id, &project_id)?;

    let files = store
        .list_project_files(&project_id)
        .api_err("Failed to list files")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(files)))
}

pub async fn get_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let file = owned_file(state.store.as_ref(), &auth.identity.id, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(file)))
}

pub async fn update_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateFileRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let mut file = owned_file(store, &auth.identity.id, &id)?;

    if let Some(name) = req.name {
        validate_file_name(&name)?;
        file.name = name;
    }
    if let Some(file_type) = req.file_type {
        file.file_type = file_type;
    }
    if let Some(content) = req.content {
        file.content = content.into();
    }
    file.last_active_at = touch(file.last_active_at);

    store.update_file(&file).api_err("Failed to update file")?;

    state.record_message(&auth.identity.id, format!("File {id} updated."));

    Ok::<_, ApiError>(Json(ApiResponse::success(StatusResponse::success(format!(
        "File {id} updated!"
    )))))
}

pub async fn delete_file(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    owned_file(store, &auth.identity.id, &id)?;

    let deleted = store.delete_file(&id).api_err("Failed to delete file")?;
    if !deleted {
        return Err(ApiError::not_found("File not found"));
    }

    state.record_message(&auth.identity.id, format!("File {id} deleted successfully."));

    Ok::<_, ApiError>(Json(ApiResponse::success(StatusResponse::success(format!(
        "File {id} deleted!"
    )))))
}
