use crate::db::repositories::anime::AnimeRepository;
use crate::db::{parse_timestamp, timestamp};
use crate::domain::UserId;
use crate::entities::{prelude::*, recommendation_cache_items, recommendation_caches};
use crate::models::anime::Anime;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Per-user recommendation cache header. The recommended titles live in
/// `recommendation_cache_items`, ordered by `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationCache {
    pub id: i32,
    pub user_id: UserId,
    pub favorite_genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<recommendation_caches::Model> for RecommendationCache {
    fn from(model: recommendation_caches::Model) -> Self {
        // Unparseable timestamps read as the epoch, which is always stale.
        Self {
            id: model.id,
            user_id: UserId::new(model.user_id),
            favorite_genres: serde_json::from_str(&model.favorite_genres).unwrap_or_default(),
            created_at: parse_timestamp(&model.created_at).unwrap_or(DateTime::UNIX_EPOCH),
            updated_at: parse_timestamp(&model.updated_at).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

pub struct RecommendationRepository {
    conn: DatabaseConnection,
}

impl RecommendationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: UserId) -> Result<Option<RecommendationCache>> {
        let row = RecommendationCaches::find()
            .filter(recommendation_caches::Column::UserId.eq(user_id.value()))
            .one(&self.conn)
            .await?;

        Ok(row.map(RecommendationCache::from))
    }

    /// Cached titles in stored order.
    pub async fn anime_for(&self, cache_id: i32) -> Result<Vec<Anime>> {
        let items = RecommendationCacheItems::find()
            .filter(recommendation_cache_items::Column::CacheId.eq(cache_id))
            .order_by_asc(recommendation_cache_items::Column::Position)
            .all(&self.conn)
            .await?;

        let ids: Vec<i32> = items.iter().map(|item| item.cached_anime_id).collect();

        AnimeRepository::new(self.conn.clone()).get_by_ids(&ids).await
    }

    /// Creates or updates the user's cache header, then swaps the whole
    /// recommended set for `cached_anime_ids` in the given order.
    pub async fn replace(
        &self,
        user_id: UserId,
        favorite_genres: &[String],
        cached_anime_ids: &[i32],
        now: DateTime<Utc>,
    ) -> Result<RecommendationCache> {
        let genres_json = serde_json::to_string(favorite_genres)?;
        let stamp = timestamp(now);

        let txn = self.conn.begin().await?;

        // The header upsert is the first statement so the transaction takes
        // the write lock before reading anything; concurrent replaces for the
        // same user then run one after another.
        RecommendationCaches::insert(recommendation_caches::ActiveModel {
            user_id: Set(user_id.value()),
            favorite_genres: Set(genres_json),
            created_at: Set(stamp.clone()),
            updated_at: Set(stamp),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(recommendation_caches::Column::UserId)
                .update_columns([
                    recommendation_caches::Column::FavoriteGenres,
                    recommendation_caches::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let cache = RecommendationCaches::find()
            .filter(recommendation_caches::Column::UserId.eq(user_id.value()))
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow!("recommendation cache for user {user_id} missing after upsert"))?;

        RecommendationCacheItems::delete_many()
            .filter(recommendation_cache_items::Column::CacheId.eq(cache.id))
            .exec(&txn)
            .await?;

        if !cached_anime_ids.is_empty() {
            let items = cached_anime_ids
                .iter()
                .zip(0_i32..)
                .map(|(&cached_anime_id, position)| recommendation_cache_items::ActiveModel {
                    cache_id: Set(cache.id),
                    cached_anime_id: Set(cached_anime_id),
                    position: Set(position),
                    ..Default::default()
                });

            RecommendationCacheItems::insert_many(items)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        Ok(RecommendationCache::from(cache))
    }
}
