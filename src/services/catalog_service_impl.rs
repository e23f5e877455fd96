use crate::clients::anilist::{AnilistClient, CatalogMedia};
use crate::db::{Genre, Store};
use crate::domain::CatalogId;
use crate::models::anime::{Anime, AnimeUpsert};
use crate::services::catalog_service::{
    AnimeError, CatalogService, GenreRefresh, SearchOutcome, SearchQuery,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Upserts each media entry; failures are logged and skipped.
pub async fn cache_media(store: &Store, media: Vec<CatalogMedia>) -> Vec<Anime> {
    let mut cached = Vec::with_capacity(media.len());

    for item in media {
        let upsert = AnimeUpsert::from(item);
        match store.upsert_anime(&upsert).await {
            Ok(anime) => cached.push(anime),
            Err(e) => warn!(anime_id = %upsert.anime_id, error = %e, "Failed to cache anime"),
        }
    }

    cached
}

pub struct SeaOrmCatalogService {
    store: Store,
    anilist: Arc<AnilistClient>,
    per_page: i32,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, anilist: Arc<AnilistClient>, per_page: i32) -> Self {
        Self {
            store,
            anilist,
            per_page,
        }
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn search(&self, query: SearchQuery) -> Result<SearchOutcome, AnimeError> {
        if query.page < 1 {
            return Err(AnimeError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }

        let page = self
            .anilist
            .search_anime(
                Some(query.q.as_str()),
                query.genre.as_deref(),
                query.page,
                self.per_page,
            )
            .await?;

        let results = cache_media(&self.store, page.media).await;

        Ok(SearchOutcome {
            page_info: page.page_info,
            results,
        })
    }

    async fn get_anime(&self, id: CatalogId, refresh: bool) -> Result<Anime, AnimeError> {
        if !id.is_valid() {
            return Err(AnimeError::NotFound(id));
        }

        if !refresh && let Some(anime) = self.store.get_anime_by_external_id(id).await? {
            return Ok(anime);
        }

        let media = self
            .anilist
            .get_anime(id)
            .await?
            .ok_or(AnimeError::NotFound(id))?;

        Ok(self.store.upsert_anime(&AnimeUpsert::from(media)).await?)
    }

    async fn refresh_genres(&self) -> Result<GenreRefresh, AnimeError> {
        let names = self.anilist.genre_list().await?;

        let mut created = 0;
        for name in &names {
            if self.store.get_or_create_genre(name).await? {
                created += 1;
            }
        }

        info!(fetched = names.len(), created, "Genres refreshed");

        Ok(GenreRefresh {
            fetched: names.len(),
            created,
        })
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, AnimeError> {
        Ok(self.store.list_genres().await?)
    }
}
