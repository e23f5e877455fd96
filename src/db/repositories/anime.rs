use crate::db::now_timestamp;
use crate::domain::CatalogId;
use crate::entities::{cached_anime, prelude::*};
use crate::models::anime::{Anime, AnimeUpsert};
use anyhow::{Result, anyhow};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use std::collections::HashMap;

/// Columns overwritten from the catalog on every upsert.
const MIRRORED_COLUMNS: [cached_anime::Column; 10] = [
    cached_anime::Column::TitleRomaji,
    cached_anime::Column::TitleEnglish,
    cached_anime::Column::TitleNative,
    cached_anime::Column::Description,
    cached_anime::Column::Genres,
    cached_anime::Column::AverageScore,
    cached_anime::Column::Popularity,
    cached_anime::Column::Episodes,
    cached_anime::Column::Status,
    cached_anime::Column::CoverImage,
];

pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn apply(active: &mut cached_anime::ActiveModel, anime: &AnimeUpsert, genres: String) {
        active.title_romaji = Set(anime.title.romaji.clone());
        active.title_english = Set(anime.title.english.clone());
        active.title_native = Set(anime.title.native.clone());
        active.description = Set(anime.description.clone());
        active.genres = Set(genres);
        active.average_score = Set(anime.average_score);
        active.popularity = Set(anime.popularity);
        active.episodes = Set(anime.episodes);
        active.status = Set(anime.status.as_str().to_string());
        active.cover_image = Set(anime.cover_image.clone());
    }

    /// Find by catalog id, then overwrite every mirrored field or insert a
    /// new row; the last caller wins.
    ///
    /// Writes are single autocommit statements so they wait on the SQLite
    /// write lock. An insert racing another insert becomes an update.
    pub async fn upsert(&self, anime: &AnimeUpsert) -> Result<Anime> {
        let genres = serde_json::to_string(&anime.genres)?;
        let now = now_timestamp();

        let existing = self.get_row(anime.anime_id).await?;

        if existing.is_some() {
            let mut active = cached_anime::ActiveModel::default();
            Self::apply(&mut active, anime, genres);
            active.updated_at = Set(now);

            CachedAnime::update_many()
                .set(active)
                .filter(cached_anime::Column::AnimeId.eq(anime.anime_id.value()))
                .exec(&self.conn)
                .await?;
        } else {
            let mut active = cached_anime::ActiveModel {
                anime_id: Set(anime.anime_id.value()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            Self::apply(&mut active, anime, genres);

            CachedAnime::insert(active)
                .on_conflict(
                    OnConflict::column(cached_anime::Column::AnimeId)
                        .update_columns(MIRRORED_COLUMNS)
                        .update_column(cached_anime::Column::UpdatedAt)
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await?;
        }

        let model = self
            .get_row(anime.anime_id)
            .await?
            .ok_or_else(|| anyhow!("cached anime {} missing after upsert", anime.anime_id))?;

        Ok(Anime::from(model))
    }

    async fn get_row(&self, anime_id: CatalogId) -> Result<Option<cached_anime::Model>> {
        Ok(CachedAnime::find()
            .filter(cached_anime::Column::AnimeId.eq(anime_id.value()))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_by_catalog_id(&self, anime_id: CatalogId) -> Result<Option<Anime>> {
        Ok(self.get_row(anime_id).await?.map(Anime::from))
    }

    /// Rows for the given catalog ids, in the order the ids were given.
    /// Ids with no cached row are skipped.
    pub async fn get_by_catalog_ids(&self, anime_ids: &[CatalogId]) -> Result<Vec<Anime>> {
        if anime_ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = anime_ids.iter().map(CatalogId::value).collect();
        let rows = CachedAnime::find()
            .filter(cached_anime::Column::AnimeId.is_in(raw.clone()))
            .all(&self.conn)
            .await?;

        let mut by_id: HashMap<i32, cached_anime::Model> =
            rows.into_iter().map(|m| (m.anime_id, m)).collect();

        Ok(raw
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(Anime::from)
            .collect())
    }

    /// Rows for the given local primary keys, in the order given.
    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Anime>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = CachedAnime::find()
            .filter(cached_anime::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;

        let mut by_id: HashMap<i32, cached_anime::Model> =
            rows.into_iter().map(|m| (m.id, m)).collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(Anime::from)
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(CachedAnime::find().count(&self.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::domain::MediaStatus;
    use crate::models::anime::AnimeTitle;

    fn upsert(anime_id: i32, romaji: &str, score: Option<f64>) -> AnimeUpsert {
        AnimeUpsert {
            anime_id: CatalogId::new(anime_id),
            title: AnimeTitle {
                romaji: romaji.to_string(),
                english: None,
                native: None,
            },
            description: None,
            genres: vec!["Action".to_string()],
            average_score: score,
            popularity: 100,
            episodes: Some(12),
            status: MediaStatus::Finished,
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_last_write_wins() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = AnimeRepository::new(store.conn.clone());

        let first = repo.upsert(&upsert(5, "First", Some(70.0))).await.unwrap();
        let mut second_fields = upsert(5, "Second", Some(82.5));
        second_fields.genres = vec!["Drama".to_string()];
        second_fields.status = MediaStatus::Releasing;
        let second = repo.upsert(&second_fields).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);

        let stored = repo
            .get_by_catalog_id(CatalogId::new(5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title.romaji, "Second");
        assert_eq!(stored.average_score, Some(82.5));
        assert_eq!(stored.genres, vec!["Drama".to_string()]);
        assert_eq!(stored.status, MediaStatus::Releasing);
        assert_eq!(stored.created_at, first.created_at);
        assert!(stored.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_get_by_catalog_ids_preserves_order() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = AnimeRepository::new(store.conn.clone());

        for id in [1, 2, 3] {
            repo.upsert(&upsert(id, "T", None)).await.unwrap();
        }

        let found = repo
            .get_by_catalog_ids(&[CatalogId::new(3), CatalogId::new(99), CatalogId::new(1)])
            .await
            .unwrap();
        let ids: Vec<i32> = found.iter().map(|a| a.anime_id.value()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_on_file_database() {
        let path = std::env::temp_dir().join(format!("anirec-upsert-{}.db", uuid::Uuid::new_v4()));
        let store = Store::with_pool_options(&format!("sqlite:{}", path.display()), 8, 1)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for writer in 0..8 {
            let repo = AnimeRepository::new(store.conn.clone());
            handles.push(tokio::spawn(async move {
                for id in 1..=10 {
                    repo.upsert(&upsert(id, &format!("Writer {writer}"), None))
                        .await?;
                }
                anyhow::Ok(())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let repo = AnimeRepository::new(store.conn.clone());
        assert_eq!(repo.count().await.unwrap(), 10);

        drop(repo);
        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
