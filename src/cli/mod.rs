//! Command-line interface for anirec.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// anirec - AniList-backed anime search and recommendation API
#[derive(Parser)]
#[command(name = "anirec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (defaults to ./config.toml and the user config dir)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Pull the genre list from AniList into the local database
    RefreshGenres,

    /// Search AniList and cache the results
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,

        /// Restrict results to one genre
        #[arg(long)]
        genre: Option<String>,

        /// Result page
        #[arg(long, default_value = "1")]
        page: i32,
    },
}

pub use commands::*;
