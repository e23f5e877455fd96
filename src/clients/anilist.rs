//! AniList GraphQL client.
//!
//! Every call is a `POST {endpoint}` with a `{query, variables}` body. Raw
//! responses can be cached in the database, keyed by a SHA-256 signature of
//! the endpoint and request body.

use crate::db::Store;
use crate::domain::{CatalogId, MediaStatus};
use crate::models::anime::{AnimeTitle, AnimeUpsert};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const ANILIST_API: &str = "https://graphql.anilist.co";

const SEARCH_QUERY: &str = r"
query ($search: String, $genre: String, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo {
            total
            currentPage
            lastPage
            hasNextPage
            perPage
        }
        media(type: ANIME, search: $search, genre: $genre, sort: POPULARITY_DESC) {
            id
            title { romaji english native }
            description(asHtml: false)
            genres
            averageScore
            popularity
            episodes
            status
            coverImage { large }
        }
    }
}
";

const DETAILS_QUERY: &str = r"
query ($id: Int!) {
    Media(id: $id, type: ANIME) {
        id
        title { romaji english native }
        description
        genres
        averageScore
        popularity
        episodes
        status
        coverImage { large }
    }
}
";

const GENRES_QUERY: &str = r"
query {
    GenreCollection
}
";

const RECOMMENDATIONS_QUERY: &str = r"
query ($genres: [String], $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo {
            total
            currentPage
            lastPage
            hasNextPage
            perPage
        }
        media(type: ANIME, genre_in: $genres, sort: [SCORE_DESC, POPULARITY_DESC]) {
            id
            title { romaji english native }
            description
            genres
            averageScore
            popularity
            episodes
            status
            coverImage { large }
        }
    }
}
";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(String),

    #[error("Catalog returned no data")]
    EmptyResult,

    #[error("Catalog has no such media")]
    NotFound,

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Option<Page>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    page_info: Option<PageInfo>,
    media: Option<Vec<Option<CatalogMedia>>>,
}

#[derive(Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<CatalogMedia>,
}

#[derive(Deserialize)]
struct GenreData {
    #[serde(rename = "GenreCollection")]
    genres: Option<Vec<Option<String>>>,
}

/// Pagination block echoed back to API clients as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: Option<i64>,
    pub current_page: Option<i32>,
    pub last_page: Option<i32>,
    pub has_next_page: Option<bool>,
    pub per_page: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMedia {
    pub id: i32,
    pub title: Option<CatalogTitle>,
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub average_score: Option<f64>,
    pub popularity: Option<i32>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    pub cover_image: Option<CoverImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
}

/// One page of media. Null entries in the upstream list are already dropped.
#[derive(Debug, Clone, Default)]
pub struct MediaPage {
    pub page_info: PageInfo,
    pub media: Vec<CatalogMedia>,
}

impl From<Page> for MediaPage {
    fn from(page: Page) -> Self {
        Self {
            page_info: page.page_info.unwrap_or_default(),
            media: page.media.unwrap_or_default().into_iter().flatten().collect(),
        }
    }
}

impl From<CatalogMedia> for AnimeUpsert {
    fn from(media: CatalogMedia) -> Self {
        let title = media.title.map_or_else(AnimeTitle::default, |t| AnimeTitle {
            romaji: t.romaji.unwrap_or_default(),
            english: t.english,
            native: t.native,
        });

        Self {
            anime_id: CatalogId::new(media.id),
            title,
            description: media.description,
            genres: media.genres.unwrap_or_default(),
            average_score: media.average_score,
            popularity: media.popularity.unwrap_or(0),
            episodes: media.episodes,
            status: media
                .status
                .as_deref()
                .map_or(MediaStatus::Unknown, MediaStatus::parse),
            cover_image: media.cover_image.and_then(|c| c.large),
        }
    }
}

#[derive(Clone)]
struct ResponseCache {
    store: Store,
    ttl: chrono::Duration,
}

#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
    endpoint: String,
    cache: Option<ResponseCache>,
}

impl AnilistClient {
    #[must_use]
    pub fn with_shared_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cache: None,
        }
    }

    /// Cache raw responses in `store` for `ttl_seconds`. Zero disables caching.
    #[must_use]
    pub fn with_response_cache(mut self, store: Store, ttl_seconds: u64) -> Self {
        self.cache = (ttl_seconds > 0).then(|| ResponseCache {
            store,
            ttl: i64::try_from(ttl_seconds)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
        });
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn search_anime(
        &self,
        search: Option<&str>,
        genre: Option<&str>,
        page: i32,
        per_page: i32,
    ) -> Result<MediaPage, CatalogError> {
        let variables = search_variables(search, genre, page, per_page);
        debug!(%variables, "Searching catalog");

        let data: PageData = self.execute(SEARCH_QUERY, &variables).await?;
        Ok(data.page.map(MediaPage::from).unwrap_or_default())
    }

    pub async fn get_anime(&self, id: CatalogId) -> Result<Option<CatalogMedia>, CatalogError> {
        let variables = json!({ "id": id.value() });

        match self.execute::<MediaData>(DETAILS_QUERY, &variables).await {
            Ok(data) => Ok(data.media),
            Err(CatalogError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn genre_list(&self) -> Result<Vec<String>, CatalogError> {
        let data: GenreData = self.execute(GENRES_QUERY, &json!({})).await?;

        Ok(data
            .genres
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter(|g| !g.trim().is_empty())
            .collect())
    }

    pub async fn recommend_by_genres(
        &self,
        genres: &[String],
        page: i32,
        per_page: i32,
    ) -> Result<MediaPage, CatalogError> {
        let variables = json!({
            "genres": genres,
            "page": page,
            "perPage": per_page,
        });

        let data: PageData = self.execute(RECOMMENDATIONS_QUERY, &variables).await?;
        Ok(data.page.map(MediaPage::from).unwrap_or_default())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<T, CatalogError> {
        let body = serde_json::to_string(&GraphQLRequest { query, variables })
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        let signature = request_signature(&self.endpoint, &body);

        if let Some(raw) = self.cached_response(&signature).await {
            match decode_response(&raw) {
                Ok(data) => {
                    debug!(signature = %signature, "Catalog response served from cache");
                    return Ok(data);
                }
                Err(e) => warn!(error = %e, "Discarding undecodable cached catalog response"),
            }
        }

        let raw = self.send(body).await?;
        let data = decode_response(&raw)?;
        self.store_response(&signature, &raw).await;

        Ok(data)
    }

    async fn send(&self, body: String) -> Result<String, CatalogError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "AniList API request failed");
                CatalogError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }
        if !status.is_success() {
            error!(status = %status, endpoint = %self.endpoint, "AniList API returned an error status");
            return Err(CatalogError::Transport(format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read AniList response body");
            CatalogError::Transport(e.to_string())
        })
    }

    async fn cached_response(&self, signature: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;

        match cache.store.get_cached_response(signature).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Catalog response cache read failed");
                None
            }
        }
    }

    async fn store_response(&self, signature: &str, raw: &str) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        if let Err(e) = cache.store.cache_response(signature, raw, cache.ttl).await {
            warn!(error = %e, "Catalog response cache write failed");
        }
    }
}

fn decode_response<T: DeserializeOwned>(raw: &str) -> Result<T, CatalogError> {
    let response: GraphQLResponse<T> = serde_json::from_str(raw).map_err(|e| {
        error!(error = %e, "Failed to decode AniList response");
        CatalogError::Decode(e.to_string())
    })?;

    response.data.ok_or(CatalogError::EmptyResult)
}

/// Search variables; `search` and `genre` are omitted when blank.
fn search_variables(search: Option<&str>, genre: Option<&str>, page: i32, per_page: i32) -> Value {
    let mut vars = Map::new();
    vars.insert("page".to_string(), json!(page));
    vars.insert("perPage".to_string(), json!(per_page));

    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        vars.insert("search".to_string(), json!(search));
    }
    if let Some(genre) = genre.map(str::trim).filter(|g| !g.is_empty()) {
        vars.insert("genre".to_string(), json!(genre));
    }

    Value::Object(vars)
}

/// SHA-256 hex digest identifying a request to a given endpoint.
#[must_use]
pub fn request_signature(endpoint: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\n");
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_variables_omit_blank_terms() {
        let vars = search_variables(Some("   "), Some(""), 1, 10);
        assert_eq!(vars, json!({ "page": 1, "perPage": 10 }));

        let vars = search_variables(Some("  naruto "), Some("Action"), 2, 10);
        assert_eq!(
            vars,
            json!({ "page": 2, "perPage": 10, "search": "naruto", "genre": "Action" })
        );

        let vars = search_variables(None, None, 1, 5);
        assert!(vars.get("search").is_none());
        assert!(vars.get("genre").is_none());
    }

    #[test]
    fn test_request_signature_is_stable() {
        let a = request_signature(ANILIST_API, r#"{"query":"q","variables":{}}"#);
        let b = request_signature(ANILIST_API, r#"{"query":"q","variables":{}}"#);
        let c = request_signature(ANILIST_API, r#"{"query":"q","variables":{"page":2}}"#);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_media_mapping_applies_defaults() {
        let media: CatalogMedia = serde_json::from_value(json!({ "id": 77 })).unwrap();
        let upsert = AnimeUpsert::from(media);

        assert_eq!(upsert.anime_id, CatalogId::new(77));
        assert_eq!(upsert.title.romaji, "");
        assert!(upsert.title.english.is_none());
        assert!(upsert.description.is_none());
        assert!(upsert.genres.is_empty());
        assert!(upsert.average_score.is_none());
        assert_eq!(upsert.popularity, 0);
        assert!(upsert.episodes.is_none());
        assert_eq!(upsert.status, MediaStatus::Unknown);
        assert!(upsert.cover_image.is_none());
    }

    #[test]
    fn test_media_mapping_full() {
        let media: CatalogMedia = serde_json::from_value(json!({
            "id": 1,
            "title": { "romaji": "Cowboy Bebop", "english": "Cowboy Bebop", "native": null },
            "description": "Space bounty hunters.",
            "genres": ["Action", "Sci-Fi"],
            "averageScore": 86,
            "popularity": 300000,
            "episodes": 26,
            "status": "FINISHED",
            "coverImage": { "large": "https://img.example/1.jpg" }
        }))
        .unwrap();

        let upsert = AnimeUpsert::from(media);
        assert_eq!(upsert.title.romaji, "Cowboy Bebop");
        assert_eq!(upsert.average_score, Some(86.0));
        assert_eq!(upsert.status, MediaStatus::Finished);
        assert_eq!(upsert.cover_image.as_deref(), Some("https://img.example/1.jpg"));
    }

    #[test]
    fn test_decode_without_data_is_empty_result() {
        let err = decode_response::<PageData>(r#"{"errors":[{"message":"boom"}]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyResult));

        let err = decode_response::<PageData>("<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[test]
    fn test_page_drops_null_media() {
        let data: PageData = decode_response(
            r#"{"data":{"Page":{"pageInfo":{"total":2,"currentPage":1,"lastPage":1,"hasNextPage":false,"perPage":10},"media":[{"id":1},null,{"id":2}]}}}"#,
        )
        .unwrap();

        let page = data.page.map(MediaPage::from).unwrap();
        assert_eq!(page.media.len(), 2);
        assert_eq!(page.page_info.total, Some(2));
        assert_eq!(page.page_info.has_next_page, Some(false));
    }
}
