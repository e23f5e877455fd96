use crate::db::{now_timestamp, parse_timestamp};
use crate::domain::{CatalogId, UserId};
use crate::entities::{prelude::*, user_profiles};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub favorite_genres: Vec<String>,
    pub watched_anime: Vec<CatalogId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<user_profiles::Model> for UserProfile {
    fn from(model: user_profiles::Model) -> Self {
        Self {
            user_id: UserId::new(model.user_id),
            favorite_genres: serde_json::from_str(&model.favorite_genres).unwrap_or_default(),
            watched_anime: serde_json::from_str(&model.watched_anime).unwrap_or_default(),
            updated_at: parse_timestamp(&model.updated_at),
        }
    }
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find(&self, user_id: UserId) -> Result<Option<user_profiles::Model>> {
        Ok(UserProfiles::find()
            .filter(user_profiles::Column::UserId.eq(user_id.value()))
            .one(&self.conn)
            .await?)
    }

    pub async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        Ok(self.find(user_id).await?.map(UserProfile::from))
    }

    /// Overwrites whichever lists are given in one `UPDATE`. Returns `None`
    /// if the user has no profile.
    pub async fn update(
        &self,
        user_id: UserId,
        favorite_genres: Option<&[String]>,
        watched_anime: Option<&[CatalogId]>,
    ) -> Result<Option<UserProfile>> {
        let mut active = user_profiles::ActiveModel::default();

        if let Some(genres) = favorite_genres {
            active.favorite_genres = Set(serde_json::to_string(genres)?);
        }
        if let Some(watched) = watched_anime {
            active.watched_anime = Set(serde_json::to_string(watched)?);
        }
        active.updated_at = Set(now_timestamp());

        let updated = UserProfiles::update_many()
            .set(active)
            .filter(user_profiles::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        self.get(user_id).await
    }
}
