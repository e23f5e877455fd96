//! Domain service for catalog lookups.
//!
//! Every title the catalog hands back is mirrored into the local anime cache
//! before it is returned to the caller.

use serde::Serialize;
use thiserror::Error;

use crate::clients::anilist::{CatalogError, PageInfo};
use crate::db::Genre;
use crate::domain::CatalogId;
use crate::models::anime::Anime;

/// Domain errors for catalog operations.
#[derive(Debug, Error)]
pub enum AnimeError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Anime not found: {0}")]
    NotFound(CatalogId),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AnimeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnimeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: String,
    pub genre: Option<String>,
    pub page: i32,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub page_info: PageInfo,
    pub results: Vec<Anime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenreRefresh {
    pub fetched: usize,
    pub created: usize,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Searches the catalog and caches every returned title.
    ///
    /// # Errors
    ///
    /// Returns [`AnimeError::Validation`] when `page < 1`.
    async fn search(&self, query: SearchQuery) -> Result<SearchOutcome, AnimeError>;

    /// Cached row for `id`, fetched from the catalog when absent or when
    /// `refresh` is set.
    async fn get_anime(&self, id: CatalogId, refresh: bool) -> Result<Anime, AnimeError>;

    /// Pulls the catalog's genre list and get-or-creates each name.
    async fn refresh_genres(&self) -> Result<GenreRefresh, AnimeError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, AnimeError>;
}
