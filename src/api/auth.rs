use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::extract::ApiJson;
use super::observability::RequestUser;
use super::{AccessTokenResponse, ApiError, AppState, RegisterResponse};
use crate::services::{AuthenticatedUser, TokenPair};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <access token>` and stores the resolved
/// [`AuthenticatedUser`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))?;

    let user = state.auth().authenticate(&token).await?;
    let user_id = user.id;

    request.extensions_mut().insert(user);
    let mut response = next.run(request).await;
    response.extensions_mut().insert(RequestUser(user_id));

    Ok(response)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = state
        .auth()
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::from(registration)),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let tokens = state
        .auth()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(tokens))
}

/// POST /auth/token/refresh
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access = state.auth().refresh(&payload.refresh).await?;
    Ok(Json(AccessTokenResponse { access }))
}

/// Shorthand for handlers behind [`auth_middleware`].
pub type CurrentUser = Extension<AuthenticatedUser>;
