use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::quota::{QuotaError, RecordKind};
use crate::server::AppState;
use crate::server::extract::ApiJson;
use crate::server::dto::{CreateProjectRequest, StatusResponse, UpdateProjectRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_project_name;
use crate::store::Store;
use crate::types::{Project, touch};

/// Loads a project the caller owns. Someone else's project is reported as
/// missing.
pub(super) fn owned_project(
    store: &dyn Store,
    user_id: &str,
    project_id: &str,
) -> Result<Project, ApiError> {
    store
        .get_project(project_id)
        .api_err("Failed to get project")?
        .filter(|p| p.owner_user_id == user_id)
        .or_not_found("Project not found")
}

pub async fn create_project(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> impl IntoResponse {
    let identity = &auth.identity;
    let store = state.store.as_ref();

    validate_project_name(&req.name)?;

    let count = store
        .count_user_projects(&identity.id)
        .api_err("Failed to count projects")?;
    let limit = state.plans.check_and_admit(
        RecordKind::Project,
        identity.plan_id.as_deref(),
        count,
    )?;

    let now = Utc::now();
    let project = Project {
        project_id: Uuid::new_v4().to_string(),
        owner_user_id: identity.id.clone(),
        name: req.name,
        summary: req.summary,
        referenced_repos: req.referenced_repos,
        packages: req.packages,
        file_refs: req.file_refs,
        goal: req.goal,
        created_at: now,
        last_active_at: now,
    };

    let admitted = store
        .create_project_capped(&project, limit)
        .api_err("Failed to create project")?;
    if !admitted {
        return Err(ApiError::from(QuotaError::QuotaExceeded {
            kind: RecordKind::Project,
            limit,
        }));
    }

    tracing::info!("Created project {} for {}", project.project_id, identity.id);
    state.record_message(&identity.id, format!("Project {} created.", project.project_id));

    let response = StatusResponse {
        project_id: Some(project.project_id),
        ..StatusResponse::success("Project created!")
    };
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_projects(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let projects = state
        .store
        .list_user_projects(&auth.identity.id)
        .api_err("Failed to list projects")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(projects)))
}

pub async fn get_project(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let project = owned_project(state.store.as_ref(), &auth.identity.id, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(project)))
}

pub async fn update_project(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let mut project = owned_project(store, &auth.identity.id, &id)?;

    if let Some(name) = req.name {
        validate_project_name(&name)?;
        project.name = name;
    }
    if let Some(summary) = req.summary {
        project.summary = summary;
    }
    if let Some(referenced_repos) = req.referenced_repos {
        project.referenced_repos = referenced_repos;
    }
    if let Some(packages) = req.packages {
        project.packages = packages;
    }
    if let Some(file_refs) = req.file_refs {
        project.file_refs = file_refs;
    }
    if let Some(goal) = req.goal {
        project.goal = goal;
    }
    project.last_active_at = touch(project.last_active_at);

    store
        .update_project(&project)
        .api_err("Failed to update project")?;

    state.record_message(&auth.identity.id, format!("Project {id} updated."));

    Ok::<_, ApiError>(Json(ApiResponse::success(StatusResponse::success(format!(
        "Project {id} updated!"
    )))))
}

pub async fn delete_project(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    owned_project(store, &auth.identity.id, &id)?;

    let deleted = store
        .delete_project(&id)
        .api_err("Failed to delete project")?;
    if !deleted {
        return Err(ApiError::not_found("Project not found"));
    }

    tracing::info!("Deleted project {id}");
    state.record_message(&auth.identity.id, format!("Project {id} deleted successfully."));

    Ok::<_, ApiError>(Json(ApiResponse::success(StatusResponse::success(format!(
        "Project {id} deleted!"
    )))))
}
