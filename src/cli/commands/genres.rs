use crate::state::SharedState;

pub async fn cmd_refresh_genres(state: &SharedState) -> anyhow::Result<()> {
    println!("Refreshing genres from {}", state.anilist.endpoint());

    let refresh = state.catalog.refresh_genres().await?;

    println!(
        "✓ {} genres fetched, {} new",
        refresh.fetched, refresh.created
    );

    let genres = state.catalog.list_genres().await?;
    let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
    println!("  {}", names.join(", "));

    Ok(())
}
