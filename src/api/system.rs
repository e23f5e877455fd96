use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, HealthResponse};

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Unknown routes get the same JSON error body as everything else.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
