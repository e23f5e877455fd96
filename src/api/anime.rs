use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::extract::{ApiPath, ApiQuery};
use super::validation::{validate_anime_id, validate_page};
use super::{AnimeDto, ApiError, AppState, SearchResponse};
use crate::domain::CatalogId;
use crate::services::{RecommendationSource, SearchQuery};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub genre: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    #[serde(default)]
    pub refresh: bool,
}

/// GET /anime/search?q=&genre=&page=
pub async fn search_anime(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = validate_page(params.page.as_deref())?;

    let outcome = state
        .catalog()
        .search(SearchQuery {
            q: params.q,
            genre: params.genre,
            page,
        })
        .await?;

    Ok(Json(SearchResponse {
        page_info: outcome.page_info,
        results: outcome.results.into_iter().map(AnimeDto::from).collect(),
    }))
}

/// GET /anime/recommendations
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): CurrentUser,
) -> Result<(Extension<RecommendationSource>, Json<Vec<AnimeDto>>), ApiError> {
    let recommendations = state.recommendations().recommend(user.id).await?;

    Ok((
        Extension(recommendations.source),
        Json(
            recommendations
                .anime
                .into_iter()
                .map(AnimeDto::from)
                .collect(),
        ),
    ))
}

/// GET /anime/{id}?refresh=
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<DetailParams>,
) -> Result<Json<AnimeDto>, ApiError> {
    let id = validate_anime_id(id)?;

    let anime = state
        .catalog()
        .get_anime(CatalogId::new(id), params.refresh)
        .await?;

    Ok(Json(AnimeDto::from(anime)))
}
