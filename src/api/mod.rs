use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod anime;
pub mod auth;
mod error;
mod extract;
mod genres;
mod observability;
mod system;
mod types;
mod user;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn crate::services::CatalogService> {
        &self.shared.catalog
    }

    #[must_use]
    pub fn recommendations(&self) -> &Arc<crate::services::RecommendationService> {
        &self.shared.recommendations
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth
    }

    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn crate::services::ProfileService> {
        &self.shared.profiles
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(create_protected_router(state.clone()))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route("/health", get(system::health));

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    // Mounted twice: under /api and at the root.
    Router::new()
        .nest("/api", api_router.clone())
        .merge(api_router)
        .route("/metrics", get(observability::get_metrics))
        .fallback(system::not_found)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state)
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/anime/search", get(anime::search_anime))
        .route("/anime/recommendations", get(anime::get_recommendations))
        .route("/anime/{id}", get(anime::get_anime))
        .route("/genres", get(genres::list_genres))
        .route(
            "/genres/refresh",
            get(genres::refresh_genres).post(genres::refresh_genres),
        )
        .route(
            "/user/preferences",
            get(user::get_preferences).put(user::update_preferences),
        )
        .route(
            "/user/ratings",
            get(user::list_ratings).post(user::rate_anime),
        )
        .route("/user/ratings/bulk", post(user::bulk_rate))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
