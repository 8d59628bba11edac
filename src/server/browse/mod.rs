//! Repository browsing endpoints backed by [`crate::vcs`].

mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn browse_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get_repo_files", post(handlers::get_repo_files))
        .route("/get_file_content", post(handlers::get_file_content))
        .route(
            "/list_branches",
            get(handlers::list_branches_query).post(handlers::list_branches),
        )
}
