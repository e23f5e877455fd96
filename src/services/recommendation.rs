//! Genre-based recommendations with a per-user cache.
//!
//! A user's cached set is reused until it is older than the freshness window
//! or their favourite genres no longer match the snapshot it was built from.

use crate::clients::anilist::{AnilistClient, CatalogError};
use crate::config::RecommendationConfig;
use crate::db::{RecommendationCache, Store};
use crate::domain::{CatalogId, UserId};
use crate::models::anime::{Anime, sort_by_score_then_popularity};
use crate::services::catalog_service_impl::cache_media;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Please set your favorite genres to get recommendations")]
    NoFavoriteGenres,

    #[error("User profile not found")]
    ProfileNotFound,

    #[error("No recommendations found")]
    NoRecommendations,

    #[error(transparent)]
    Catalog(CatalogError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for RecommendationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecommendationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Missing,
    Expired,
    GenresChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

/// Decides whether a cached recommendation set can be served as-is.
#[must_use]
pub fn evaluate_freshness(
    cache: Option<&RecommendationCache>,
    current_genres: &[String],
    now: DateTime<Utc>,
    window: Duration,
) -> Freshness {
    let Some(cache) = cache else {
        return Freshness::Stale(StaleReason::Missing);
    };

    if now - cache.updated_at >= window {
        return Freshness::Stale(StaleReason::Expired);
    }

    let snapshot: HashSet<&str> = cache.favorite_genres.iter().map(String::as_str).collect();
    let current: HashSet<&str> = current_genres.iter().map(String::as_str).collect();

    if snapshot == current {
        Freshness::Fresh
    } else {
        Freshness::Stale(StaleReason::GenresChanged)
    }
}

/// Oversized settings saturate instead of overflowing.
fn freshness_window(hours: i64) -> Duration {
    Duration::try_hours(hours).unwrap_or(Duration::MAX)
}

/// Drops watched titles and caps the list.
fn visible(anime: Vec<Anime>, watched: &HashSet<CatalogId>, limit: usize) -> Vec<Anime> {
    anime
        .into_iter()
        .filter(|a| !watched.contains(&a.anime_id))
        .take(limit)
        .collect()
}

/// Whether recommendations were served from the per-user cache or fetched
/// from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Cached,
    Refreshed,
}

impl RecommendationSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Refreshed => "refreshed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recommendations {
    pub anime: Vec<Anime>,
    pub source: RecommendationSource,
}

impl Recommendations {
    fn new(anime: Vec<Anime>, source: RecommendationSource) -> Self {
        metrics::counter!("recommendation_requests_total", "outcome" => source.as_str())
            .increment(1);
        Self { anime, source }
    }
}

pub struct RecommendationService {
    store: Store,
    anilist: Arc<AnilistClient>,
    settings: RecommendationConfig,
}

impl RecommendationService {
    #[must_use]
    pub const fn new(
        store: Store,
        anilist: Arc<AnilistClient>,
        settings: RecommendationConfig,
    ) -> Self {
        Self {
            store,
            anilist,
            settings,
        }
    }

    fn window(&self) -> Duration {
        freshness_window(self.settings.freshness_hours)
    }

    pub async fn recommend(&self, user_id: UserId) -> Result<Recommendations, RecommendationError> {
        self.recommend_at(user_id, Utc::now()).await
    }

    pub async fn recommend_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, RecommendationError> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(RecommendationError::ProfileNotFound)?;

        if profile.favorite_genres.is_empty() {
            return Err(RecommendationError::NoFavoriteGenres);
        }

        let watched: HashSet<CatalogId> = profile.watched_anime.iter().copied().collect();
        let cache = self.store.get_recommendation_cache(user_id).await?;

        let freshness =
            evaluate_freshness(cache.as_ref(), &profile.favorite_genres, now, self.window());

        if let (Freshness::Fresh, Some(cache)) = (freshness, cache.as_ref()) {
            debug!(user_id = %user_id, "Serving cached recommendations");

            let cached = self.store.get_recommended_anime(cache.id).await?;
            return Ok(Recommendations::new(
                visible(cached, &watched, self.settings.max_results),
                RecommendationSource::Cached,
            ));
        }

        info!(user_id = %user_id, ?freshness, "Refreshing recommendations");

        let page = match self
            .anilist
            .recommend_by_genres(&profile.favorite_genres, 1, self.settings.fetch_size)
            .await
        {
            Ok(page) => page,
            Err(CatalogError::EmptyResult) => return Err(RecommendationError::NoRecommendations),
            Err(e) => return Err(RecommendationError::Catalog(e)),
        };

        let candidates = page
            .media
            .into_iter()
            .filter(|m| !watched.contains(&CatalogId::new(m.id)))
            .collect();

        let mut anime = cache_media(&self.store, candidates).await;
        sort_by_score_then_popularity(&mut anime);

        let mut seen = HashSet::new();
        anime.retain(|a| seen.insert(a.id));
        anime.truncate(self.settings.max_results);

        let ids: Vec<i32> = anime.iter().map(|a| a.id).collect();
        self.store
            .replace_recommendations(user_id, &profile.favorite_genres, &ids, now)
            .await?;

        Ok(Recommendations::new(anime, RecommendationSource::Refreshed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaStatus;
    use crate::models::anime::AnimeTitle;

    fn cache(genres: &[&str], updated_at: DateTime<Utc>) -> RecommendationCache {
        RecommendationCache {
            id: 1,
            user_id: UserId::new(1),
            favorite_genres: genres.iter().map(ToString::to_string).collect(),
            created_at: updated_at,
            updated_at,
        }
    }

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_missing_cache_is_stale() {
        assert_eq!(
            evaluate_freshness(None, &genres(&["Action"]), Utc::now(), Duration::hours(24)),
            Freshness::Stale(StaleReason::Missing)
        );
    }

    #[test]
    fn test_recent_cache_with_same_genres_is_fresh() {
        let now = Utc::now();
        let c = cache(&["Action", "Comedy"], now - Duration::hours(23));

        assert_eq!(
            evaluate_freshness(Some(&c), &genres(&["Comedy", "Action"]), now, Duration::hours(24)),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_cache_expires_at_window_boundary() {
        let now = Utc::now();
        let c = cache(&["Action"], now - Duration::hours(24));

        assert_eq!(
            evaluate_freshness(Some(&c), &genres(&["Action"]), now, Duration::hours(24)),
            Freshness::Stale(StaleReason::Expired)
        );
    }

    #[test]
    fn test_genre_drift_is_stale() {
        let now = Utc::now();
        let c = cache(&["Action", "Comedy"], now);

        assert_eq!(
            evaluate_freshness(Some(&c), &genres(&["Action"]), now, Duration::hours(24)),
            Freshness::Stale(StaleReason::GenresChanged)
        );
        assert_eq!(
            evaluate_freshness(
                Some(&c),
                &genres(&["Action", "Comedy", "Drama"]),
                now,
                Duration::hours(24)
            ),
            Freshness::Stale(StaleReason::GenresChanged)
        );
    }

    #[test]
    fn test_visible_filters_watched_and_caps() {
        let anime: Vec<Anime> = (1..=15)
            .map(|id| Anime {
                id,
                anime_id: CatalogId::new(id),
                title: AnimeTitle::default(),
                description: None,
                genres: Vec::new(),
                average_score: None,
                popularity: 0,
                episodes: None,
                status: MediaStatus::Unknown,
                cover_image: None,
                created_at: String::new(),
                updated_at: String::new(),
            })
            .collect();

        let watched: HashSet<CatalogId> = [CatalogId::new(2), CatalogId::new(5)].into();
        let out = visible(anime, &watched, 10);

        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|a| !watched.contains(&a.anime_id)));
        assert_eq!(out[1].anime_id, CatalogId::new(3));
    }

    #[test]
    fn test_oversized_window_saturates() {
        assert_eq!(freshness_window(24), Duration::hours(24));
        assert_eq!(freshness_window(i64::MAX), Duration::MAX);

        let c = cache(&["Action"], DateTime::UNIX_EPOCH);
        assert_eq!(
            evaluate_freshness(
                Some(&c),
                &genres(&["Action"]),
                Utc::now(),
                freshness_window(i64::MAX)
            ),
            Freshness::Fresh
        );
    }
}
