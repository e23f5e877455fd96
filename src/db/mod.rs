use crate::config::SecurityConfig;
use crate::domain::{CatalogId, UserId};
use crate::models::anime::{Anime, AnimeUpsert};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::genre::Genre;
pub use repositories::preference::AnimeRating;
pub use repositories::profile::UserProfile;
pub use repositories::recommendation::RecommendationCache;
pub use repositories::user::User;

/// Formats a timestamp the way every table stores it: RFC 3339, UTC, fixed
/// microsecond precision so the strings sort chronologically.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn now_timestamp() -> String {
    timestamp(Utc::now())
}

#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        let in_memory = path_str.starts_with(":memory:");

        if !in_memory {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every connection to `:memory:` is a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // Recycling the only in-memory connection would drop the database.
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        // Readers keep going while one writer holds the lock.
        if !in_memory {
            conn.execute_unprepared("PRAGMA journal_mode=WAL").await?;
        }

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn preference_repo(&self) -> repositories::preference::PreferenceRepository {
        repositories::preference::PreferenceRepository::new(self.conn.clone())
    }

    fn recommendation_repo(&self) -> repositories::recommendation::RecommendationRepository {
        repositories::recommendation::RecommendationRepository::new(self.conn.clone())
    }

    fn response_cache_repo(&self) -> repositories::response_cache::ResponseCacheRepository {
        repositories::response_cache::ResponseCacheRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Anime cache
    // ========================================================================

    pub async fn upsert_anime(&self, anime: &AnimeUpsert) -> Result<Anime> {
        self.anime_repo().upsert(anime).await
    }

    pub async fn get_anime_by_external_id(&self, anime_id: CatalogId) -> Result<Option<Anime>> {
        self.anime_repo().get_by_catalog_id(anime_id).await
    }

    pub async fn get_anime_by_external_ids(&self, anime_ids: &[CatalogId]) -> Result<Vec<Anime>> {
        self.anime_repo().get_by_catalog_ids(anime_ids).await
    }

    pub async fn count_anime(&self) -> Result<u64> {
        self.anime_repo().count().await
    }

    // ========================================================================
    // Genres
    // ========================================================================

    pub async fn get_or_create_genre(&self, name: &str) -> Result<bool> {
        self.genre_repo().get_or_create(name).await
    }

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.genre_repo().list().await
    }

    // ========================================================================
    // Users & profiles
    // ========================================================================

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .create(username, email, password, security)
            .await
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(user_id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(username, password).await
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        self.profile_repo().get(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        favorite_genres: Option<&[String]>,
        watched_anime: Option<&[CatalogId]>,
    ) -> Result<Option<UserProfile>> {
        self.profile_repo()
            .update(user_id, favorite_genres, watched_anime)
            .await
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    pub async fn list_ratings(&self, user_id: UserId) -> Result<Vec<AnimeRating>> {
        self.preference_repo().list(user_id).await
    }

    pub async fn upsert_rating(
        &self,
        user_id: UserId,
        anime_id: CatalogId,
        rating: i32,
    ) -> Result<AnimeRating> {
        self.preference_repo().upsert(user_id, anime_id, rating).await
    }

    pub async fn upsert_ratings(
        &self,
        user_id: UserId,
        ratings: &[(CatalogId, i32)],
    ) -> Result<Vec<AnimeRating>> {
        self.preference_repo().upsert_many(user_id, ratings).await
    }

    // ========================================================================
    // Recommendation cache
    // ========================================================================

    pub async fn get_recommendation_cache(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecommendationCache>> {
        self.recommendation_repo().get(user_id).await
    }

    pub async fn get_recommended_anime(&self, cache_id: i32) -> Result<Vec<Anime>> {
        self.recommendation_repo().anime_for(cache_id).await
    }

    pub async fn replace_recommendations(
        &self,
        user_id: UserId,
        favorite_genres: &[String],
        cached_anime_ids: &[i32],
        now: DateTime<Utc>,
    ) -> Result<RecommendationCache> {
        self.recommendation_repo()
            .replace(user_id, favorite_genres, cached_anime_ids, now)
            .await
    }

    // ========================================================================
    // Catalog response cache
    // ========================================================================

    pub async fn get_cached_response(&self, signature: &str) -> Result<Option<String>> {
        self.response_cache_repo().get(signature).await
    }

    pub async fn cache_response(
        &self,
        signature: &str,
        body: &str,
        ttl: chrono::Duration,
    ) -> Result<()> {
        self.response_cache_repo().put(signature, body, ttl).await
    }
}
