mod genres;
mod search;

pub use genres::cmd_refresh_genres;
pub use search::cmd_search_anime;
