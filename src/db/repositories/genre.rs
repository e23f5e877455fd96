use crate::db::now_timestamp;
use crate::entities::{genres, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<genres::Model> for Genre {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `true` when a new row was inserted. A name that already
    /// exists, including one inserted concurrently, is left untouched.
    pub async fn get_or_create(&self, name: &str) -> Result<bool> {
        let now = now_timestamp();
        let active = genres::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = Genres::insert(active)
            .on_conflict(
                OnConflict::column(genres::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let rows = Genres::find()
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Genre::from).collect())
    }
}
