use serde::{Deserialize, Serialize};

use crate::domain::{CatalogId, MediaStatus};
use crate::entities::cached_anime;

/// A row of the local anime cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: i32,
    pub anime_id: CatalogId,
    pub title: AnimeTitle,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub average_score: Option<f64>,
    pub popularity: i32,
    pub episodes: Option<i32>,
    pub status: MediaStatus,
    pub cover_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimeTitle {
    pub romaji: String,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// The mirrored field set written on every upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeUpsert {
    pub anime_id: CatalogId,
    pub title: AnimeTitle,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub average_score: Option<f64>,
    pub popularity: i32,
    pub episodes: Option<i32>,
    pub status: MediaStatus,
    pub cover_image: Option<String>,
}

impl From<cached_anime::Model> for Anime {
    fn from(model: cached_anime::Model) -> Self {
        Self {
            id: model.id,
            anime_id: CatalogId::new(model.anime_id),
            title: AnimeTitle {
                romaji: model.title_romaji,
                english: model.title_english,
                native: model.title_native,
            },
            description: model.description,
            genres: serde_json::from_str(&model.genres).unwrap_or_default(),
            average_score: model.average_score,
            popularity: model.popularity,
            episodes: model.episodes,
            status: MediaStatus::parse(&model.status),
            cover_image: model.cover_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Orders by score (missing scores last), then popularity, both descending.
pub fn sort_by_score_then_popularity(anime: &mut [Anime]) {
    anime.sort_by(|a, b| {
        let score = |x: &Anime| x.average_score.unwrap_or(f64::NEG_INFINITY);
        score(b)
            .total_cmp(&score(a))
            .then_with(|| b.popularity.cmp(&a.popularity))
    });
}
