//! Project and file records owned by the calling user, plus the caller's
//! diagnostic message log.

mod files;
mod messages;
mod projects;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn records_router() -> Router<Arc<AppState>> {
    Router::new()
        // Projects
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Files
        .route("/files", post(files::create_file))
        .route("/files/by_user/", get(files::list_user_files))
        .route("/files/by_project/{id}", get(files::list_project_files))
        .route(
            "/files/{id}",
            get(files::get_file)
                .put(files::update_file)
                .delete(files::delete_file),
        )
        // Diagnostics
        .route("/status_messages", get(messages::list_messages))
}
