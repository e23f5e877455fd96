use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::extract::ApiJson;
use super::{ApiError, AppState};
use crate::db::AnimeRating;
use crate::services::{PreferencesUpdate, RatingInput, UserPreferences};

/// GET /user/preferences
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
) -> Result<Json<UserPreferences>, ApiError> {
    let preferences = state.profiles().get_preferences(user.id).await?;
    Ok(Json(preferences))
}

/// PUT /user/preferences
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
    ApiJson(update): ApiJson<PreferencesUpdate>,
) -> Result<Json<UserPreferences>, ApiError> {
    let preferences = state
        .profiles()
        .update_preferences(user.id, update)
        .await?;
    Ok(Json(preferences))
}

/// GET /user/ratings
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
) -> Result<Json<Vec<AnimeRating>>, ApiError> {
    let ratings = state.profiles().list_ratings(user.id).await?;
    Ok(Json(ratings))
}

/// POST /user/ratings
pub async fn rate_anime(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
    ApiJson(input): ApiJson<RatingInput>,
) -> Result<Json<AnimeRating>, ApiError> {
    let rating = state.profiles().rate(user.id, input).await?;
    Ok(Json(rating))
}

/// POST /user/ratings/bulk
pub async fn bulk_rate(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
    ApiJson(inputs): ApiJson<Vec<RatingInput>>,
) -> Result<Json<Vec<AnimeRating>>, ApiError> {
    let ratings = state.profiles().rate_many(user.id, inputs).await?;
    Ok(Json(ratings))
}
