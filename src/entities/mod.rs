pub mod prelude;

pub mod anime_preferences;
pub mod cached_anime;
pub mod catalog_response_cache;
pub mod genres;
pub mod recommendation_cache_items;
pub mod recommendation_caches;
pub mod user_profiles;
pub mod users;
