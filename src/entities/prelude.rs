pub use super::anime_preferences::Entity as AnimePreferences;
pub use super::cached_anime::Entity as CachedAnime;
pub use super::catalog_response_cache::Entity as CatalogResponseCache;
pub use super::genres::Entity as Genres;
pub use super::recommendation_cache_items::Entity as RecommendationCacheItems;
pub use super::recommendation_caches::Entity as RecommendationCaches;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
