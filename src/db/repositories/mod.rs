pub mod anime;
pub mod genre;
pub mod preference;
pub mod profile;
pub mod recommendation;
pub mod response_cache;
pub mod user;
