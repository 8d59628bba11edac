use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Result as StoreResult;
use crate::quota::QuotaError;
use crate::vcs::VcsError;

/// Standard success wrapper: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

/// API error that converts to a `{"detail": ...}` response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "detail": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<VcsError> for ApiError {
    fn from(err: VcsError) -> Self {
        let message = err.to_string();
        match err {
            VcsError::UnsupportedProvider(_)
            | VcsError::InvalidUrl(_)
            | VcsError::EmptyRepository(_)
            | VcsError::NotAFile(_)
            | VcsError::BinaryFile(_) => Self::bad_request(message),
            VcsError::PlanRequired => Self::forbidden(message),
            VcsError::RepositoryNotFound
            | VcsError::BranchNotFound(_)
            | VcsError::PathNotFound(_) => Self::not_found(message),
            VcsError::Provider { .. } => {
                tracing::error!("{message}");
                Self::internal(message)
            }
        }
    }
}

impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::QuotaExceeded { .. } => Self::forbidden(err.to_string()),
            QuotaError::MissingParent => Self::bad_request(err.to_string()),
        }
    }
}

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            ApiError::internal(message)
        })
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::RecordKind;
    use crate::vcs::Provider;

    #[test]
    fn test_vcs_status_mapping() {
        let cases = [
            (VcsError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (VcsError::EmptyRepository(Provider::GitLab), StatusCode::BAD_REQUEST),
            (VcsError::BinaryFile("a.png".into()), StatusCode::BAD_REQUEST),
            (VcsError::PlanRequired, StatusCode::FORBIDDEN),
            (VcsError::RepositoryNotFound, StatusCode::NOT_FOUND),
            (VcsError::PathNotFound("a".into()), StatusCode::NOT_FOUND),
            (
                VcsError::Provider {
                    provider: Provider::GitHub,
                    status: Some(502),
                    message: "bad gateway".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_quota_status_mapping() {
        let exceeded = ApiError::from(QuotaError::QuotaExceeded {
            kind: RecordKind::Project,
            limit: 1,
        });
        assert_eq!(exceeded.status, StatusCode::FORBIDDEN);
        assert!(exceeded.message.contains("maximum of 1 projects"));

        let missing = ApiError::from(QuotaError::MissingParent);
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }
}
