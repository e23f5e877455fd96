pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;

    let command = cli.command.unwrap_or(Commands::Serve);

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists; leaving it untouched.");
        }
        return Ok(());
    }

    config.validate()?;

    match command {
        Commands::Serve => {
            let prometheus_handle = init_metrics(&config)?;
            serve(config, prometheus_handle).await
        }

        Commands::RefreshGenres => {
            let state = SharedState::new(config).await?;
            cli::cmd_refresh_genres(&state).await
        }

        Commands::Search { query, genre, page } => {
            let state = SharedState::new(config).await?;
            cli::cmd_search_anime(&state, &query.join(" "), genre, page).await
        }

        Commands::Init => Ok(()),
    }
}

fn init_metrics(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "anirec")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn serve(config: Config, prometheus_handle: Option<PrometheusHandle>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);

    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 API server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
