//! Domain service for user preferences and ratings.
//!
//! Favourite genres drive recommendations; watched ids are excluded from
//! them. Ratings are stored but not otherwise interpreted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::db::AnimeRating;
use crate::domain::{CatalogId, UserId};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

/// Errors specific to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User profile not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPreferences {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub favorite_genres: Vec<String>,
    pub watched_anime: Vec<CatalogId>,
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub favorite_genres: Option<Vec<String>>,
    pub watched_anime: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RatingInput {
    pub anime_id: i32,
    pub rating: i32,
}

/// Domain service trait for profiles.
#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_preferences(&self, user_id: UserId) -> Result<UserPreferences, ProfileError>;

    /// # Errors
    ///
    /// Returns [`ProfileError::Validation`] for blank genres or non-positive ids.
    async fn update_preferences(
        &self,
        user_id: UserId,
        update: PreferencesUpdate,
    ) -> Result<UserPreferences, ProfileError>;

    async fn list_ratings(&self, user_id: UserId) -> Result<Vec<AnimeRating>, ProfileError>;

    /// Creates or updates the user's rating for one title.
    async fn rate(&self, user_id: UserId, input: RatingInput) -> Result<AnimeRating, ProfileError>;

    /// Validates every entry first, then writes all of them or none.
    async fn rate_many(
        &self,
        user_id: UserId,
        inputs: Vec<RatingInput>,
    ) -> Result<Vec<AnimeRating>, ProfileError>;
}

/// Trims, drops duplicates (keeping the first) and rejects blank names.
pub fn normalize_genres(genres: Vec<String>) -> Result<Vec<String>, ProfileError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(genres.len());

    for genre in genres {
        let trimmed = genre.trim();
        if trimmed.is_empty() {
            return Err(ProfileError::Validation(
                "Genre names cannot be blank.".to_string(),
            ));
        }
        if seen.insert(trimmed.to_string()) {
            normalized.push(trimmed.to_string());
        }
    }

    Ok(normalized)
}

pub fn normalize_watched(ids: Vec<i32>) -> Result<Vec<CatalogId>, ProfileError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(ids.len());

    for id in ids.into_iter().map(CatalogId::new) {
        if !id.is_valid() {
            return Err(ProfileError::Validation(format!(
                "Invalid anime id: {id}"
            )));
        }
        if seen.insert(id) {
            normalized.push(id);
        }
    }

    Ok(normalized)
}

pub fn validate_rating(input: &RatingInput) -> Result<(CatalogId, i32), ProfileError> {
    let anime_id = CatalogId::new(input.anime_id);
    if !anime_id.is_valid() {
        return Err(ProfileError::Validation(format!(
            "Invalid anime id: {anime_id}"
        )));
    }
    if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
        return Err(ProfileError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}."
        )));
    }
    Ok((anime_id, input.rating))
}
