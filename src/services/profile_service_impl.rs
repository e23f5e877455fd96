//! `SeaORM` implementation of the `ProfileService` trait.

use crate::db::{AnimeRating, Store};
use crate::domain::UserId;
use crate::services::profile_service::{
    PreferencesUpdate, ProfileError, ProfileService, RatingInput, UserPreferences,
    normalize_genres, normalize_watched, validate_rating,
};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn get_preferences(&self, user_id: UserId) -> Result<UserPreferences, ProfileError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;

        Ok(UserPreferences {
            id: user.id,
            username: user.username,
            email: user.email,
            favorite_genres: profile.favorite_genres,
            watched_anime: profile.watched_anime,
        })
    }

    async fn update_preferences(
        &self,
        user_id: UserId,
        update: PreferencesUpdate,
    ) -> Result<UserPreferences, ProfileError> {
        let genres = update.favorite_genres.map(normalize_genres).transpose()?;
        let watched = update.watched_anime.map(normalize_watched).transpose()?;

        self.store
            .update_profile(user_id, genres.as_deref(), watched.as_deref())
            .await?
            .ok_or(ProfileError::NotFound)?;

        info!(user_id = %user_id, "Preferences updated");

        self.get_preferences(user_id).await
    }

    async fn list_ratings(&self, user_id: UserId) -> Result<Vec<AnimeRating>, ProfileError> {
        Ok(self.store.list_ratings(user_id).await?)
    }

    async fn rate(&self, user_id: UserId, input: RatingInput) -> Result<AnimeRating, ProfileError> {
        let (anime_id, rating) = validate_rating(&input)?;
        Ok(self.store.upsert_rating(user_id, anime_id, rating).await?)
    }

    async fn rate_many(
        &self,
        user_id: UserId,
        inputs: Vec<RatingInput>,
    ) -> Result<Vec<AnimeRating>, ProfileError> {
        let validated = inputs
            .iter()
            .map(validate_rating)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.store.upsert_ratings(user_id, &validated).await?)
    }
}
