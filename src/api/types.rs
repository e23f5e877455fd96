use serde::{Deserialize, Serialize};

use crate::clients::anilist::PageInfo;
use crate::models::anime::Anime;
use crate::services::{GenreRefresh, Registration, UserInfo};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Flat wire shape of a cached catalog title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeDto {
    pub id: i32,
    pub anime_id: i32,
    pub title_romaji: String,
    pub title_english: Option<String>,
    pub title_native: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub average_score: Option<f64>,
    pub popularity: i32,
    pub episodes: Option<i32>,
    pub status: String,
    pub cover_image: Option<String>,
}

impl From<Anime> for AnimeDto {
    fn from(anime: Anime) -> Self {
        Self {
            id: anime.id,
            anime_id: anime.anime_id.value(),
            title_romaji: anime.title.romaji,
            title_english: anime.title.english,
            title_native: anime.title.native,
            description: anime.description,
            genres: anime.genres,
            average_score: anime.average_score,
            popularity: anime.popularity,
            episodes: anime.episodes,
            status: anime.status.as_str().to_string(),
            cover_image: anime.cover_image,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub page_info: PageInfo,
    pub results: Vec<AnimeDto>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub refresh: String,
    pub access: String,
}

impl From<Registration> for RegisterResponse {
    fn from(registration: Registration) -> Self {
        Self {
            user: registration.user,
            refresh: registration.tokens.refresh,
            access: registration.tokens.access,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct GenreRefreshResponse {
    pub status: &'static str,
    pub fetched: usize,
    pub created: usize,
}

impl From<GenreRefresh> for GenreRefreshResponse {
    fn from(refresh: GenreRefresh) -> Self {
        Self {
            status: "genres refreshed",
            fetched: refresh.fetched,
            created: refresh.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}
