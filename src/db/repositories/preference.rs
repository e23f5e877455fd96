use crate::db::now_timestamp;
use crate::domain::{CatalogId, UserId};
use crate::entities::{anime_preferences, prelude::*};
use anyhow::{Result, anyhow};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeRating {
    pub id: i32,
    pub anime_id: CatalogId,
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<anime_preferences::Model> for AnimeRating {
    fn from(model: anime_preferences::Model) -> Self {
        Self {
            id: model.id,
            anime_id: CatalogId::new(model.anime_id),
            rating: model.rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct PreferenceRepository {
    conn: DatabaseConnection,
}

impl PreferenceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<AnimeRating>> {
        let rows = AnimePreferences::find()
            .filter(anime_preferences::Column::UserId.eq(user_id.value()))
            .order_by_asc(anime_preferences::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(AnimeRating::from).collect())
    }

    pub async fn upsert(
        &self,
        user_id: UserId,
        anime_id: CatalogId,
        rating: i32,
    ) -> Result<AnimeRating> {
        let model = upsert_on(&self.conn, user_id, anime_id, rating).await?;
        Ok(AnimeRating::from(model))
    }

    /// All-or-nothing: either every rating is written or none is.
    pub async fn upsert_many(
        &self,
        user_id: UserId,
        ratings: &[(CatalogId, i32)],
    ) -> Result<Vec<AnimeRating>> {
        let txn = self.conn.begin().await?;

        let mut written = Vec::with_capacity(ratings.len());
        for &(anime_id, rating) in ratings {
            let model = upsert_on(&txn, user_id, anime_id, rating).await?;
            written.push(AnimeRating::from(model));
        }

        txn.commit().await?;
        Ok(written)
    }
}

async fn upsert_on<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    anime_id: CatalogId,
    rating: i32,
) -> Result<anime_preferences::Model> {
    let now = now_timestamp();

    AnimePreferences::insert(anime_preferences::ActiveModel {
        user_id: Set(user_id.value()),
        anime_id: Set(anime_id.value()),
        rating: Set(rating),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            anime_preferences::Column::UserId,
            anime_preferences::Column::AnimeId,
        ])
        .update_columns([
            anime_preferences::Column::Rating,
            anime_preferences::Column::UpdatedAt,
        ])
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    AnimePreferences::find()
        .filter(anime_preferences::Column::UserId.eq(user_id.value()))
        .filter(anime_preferences::Column::AnimeId.eq(anime_id.value()))
        .one(conn)
        .await?
        .ok_or_else(|| anyhow!("rating for anime {anime_id} missing after upsert"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::Store;

    async fn store_with_user() -> (Store, UserId) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let user = store
            .create_user("rater", "", "Secret1!", &security)
            .await
            .unwrap()
            .unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn test_rating_is_unique_per_user_and_anime() {
        let (store, user_id) = store_with_user().await;
        let repo = PreferenceRepository::new(store.conn.clone());

        let first = repo.upsert(user_id, CatalogId::new(7), 6).await.unwrap();
        let second = repo.upsert(user_id, CatalogId::new(7), 9).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = repo.list(user_id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rating, 9);
    }

    #[tokio::test]
    async fn test_upsert_many() {
        let (store, user_id) = store_with_user().await;
        let repo = PreferenceRepository::new(store.conn.clone());

        let written = repo
            .upsert_many(
                user_id,
                &[(CatalogId::new(1), 3), (CatalogId::new(2), 8), (CatalogId::new(1), 5)],
            )
            .await
            .unwrap();
        assert_eq!(written.len(), 3);

        let all = repo.list(user_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].anime_id, CatalogId::new(1));
        assert_eq!(all[0].rating, 5);
    }
}
