use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState, GenreRefreshResponse};
use crate::db::Genre;

/// GET /genres
pub async fn list_genres(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Genre>>, ApiError> {
    let genres = state.catalog().list_genres().await?;
    Ok(Json(genres))
}

/// GET|POST /genres/refresh
pub async fn refresh_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenreRefreshResponse>, ApiError> {
    let refresh = state.catalog().refresh_genres().await?;
    Ok(Json(refresh.into()))
}
