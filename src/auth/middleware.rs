use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::IdentityError;
use super::helpers::extract_bearer_token;
use crate::server::AppState;
use crate::types::UserIdentity;

/// Extractor that requires a resolvable caller identity.
pub struct RequireUser {
    pub identity: UserIdentity,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = match self {
            IdentityError::Internal(ref e) => {
                tracing::error!("Identity resolution failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        };
        let message = match status {
            StatusCode::UNAUTHORIZED => self.to_string(),
            _ => "Internal server error".to_string(),
        };

        let mut response = (status, Json(json!({ "detail": message }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"recombinant\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_bearer_token(auth_header)?;
        let identity = state.identity.resolve(raw_token)?;

        Ok(RequireUser { identity })
    }
}
