use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::browse::browse_router;
use super::records::records_router;
use crate::auth::IdentityProvider;
use crate::quota::PlanTable;
use crate::store::Store;
use crate::vcs::VcsConnector;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub vcs: VcsConnector,
    pub plans: PlanTable,
}

impl AppState {
    /// Appends to the caller's status log. Failures are logged, never
    /// surfaced to the request.
    pub fn record_message(&self, user_id: &str, message: impl AsRef<str>) {
        if let Err(e) = self.store.append_message(user_id, message.as_ref()) {
            tracing::warn!("Failed to record status message for {user_id}: {e}");
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(browse_router())
        .merge(records_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
