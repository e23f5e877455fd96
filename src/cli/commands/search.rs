use crate::services::SearchQuery;
use crate::state::SharedState;

pub async fn cmd_search_anime(
    state: &SharedState,
    query: &str,
    genre: Option<String>,
    page: i32,
) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let outcome = state
        .catalog
        .search(SearchQuery {
            q: query.to_string(),
            genre,
            page,
        })
        .await?;

    if outcome.results.is_empty() {
        println!("No anime found matching '{query}'");
        return Ok(());
    }

    println!();
    let info = &outcome.page_info;
    println!(
        "Search Results (page {} of {}, {} total):",
        info.current_page.unwrap_or(page),
        info.last_page.map_or_else(|| "?".to_string(), |p| p.to_string()),
        info.total.map_or_else(|| "?".to_string(), |t| t.to_string()),
    );
    println!("{:-<60}", "");

    for anime in &outcome.results {
        let eps = anime
            .episodes
            .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"));
        let score = anime
            .average_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.0}"));
        let title_en = anime.title.english.as_deref().unwrap_or("");

        println!("• {} ({})", anime.title.romaji, eps);
        if !title_en.is_empty() && title_en != anime.title.romaji {
            println!("  EN: {title_en}");
        }
        println!(
            "  Status: {} | ID: {} | Score: {}",
            anime.status, anime.anime_id, score
        );
        if !anime.genres.is_empty() {
            println!("  Genres: {}", anime.genres.join(", "));
        }
        println!();
    }

    if info.has_next_page.unwrap_or(false) {
        println!("More results: anirec search \"{query}\" --page {}", page + 1);
    }

    Ok(())
}
