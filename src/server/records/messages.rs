use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn list_messages(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let log = state
        .store
        .list_messages(&auth.identity.id)
        .api_err("Failed to load status messages")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(log)))
}
