//! Request logging and metrics.
//!
//! Each request gets one `request` span and one closing "Request finished"
//! event. Inner layers and handlers report what they learned (who the caller
//! was, where recommendations came from) through response extensions, which
//! the logger reads once the response is back.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

use super::AppState;
use crate::domain::UserId;
use crate::services::RecommendationSource;

/// Authenticated caller, set on the response by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct RequestUser(pub UserId);

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

fn outcome_for(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

fn record_request_metrics(method: &Method, route: &str, status: StatusCode, elapsed: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.as_u16().to_string()),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    // Unmatched paths fall back to the raw path.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route = route.as_deref(),
        user_id = field::Empty,
    );

    let response = next.run(req).instrument(span.clone()).await;

    let elapsed = start.elapsed();
    let status = response.status();
    let user = response.extensions().get::<RequestUser>().copied();
    let recommendations = response
        .extensions()
        .get::<RecommendationSource>()
        .map(|source| source.as_str());

    if let Some(RequestUser(user_id)) = user {
        span.record("user_id", user_id.value());
    }

    record_request_metrics(&method, route.as_deref().unwrap_or(&path), status, elapsed);

    span.in_scope(|| {
        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome = outcome_for(status),
            recommendations,
            "Request finished"
        );
    });

    response
}

/// JSON-only API, so the header set is small.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));

    response
}
