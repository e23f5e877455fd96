use std::sync::Arc;

use crate::clients::anilist::AnilistClient;
use crate::config::{CatalogConfig, Config};
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, ProfileService, RecommendationService, SeaOrmAuthService,
    SeaOrmCatalogService, SeaOrmProfileService, TokenIssuer,
};

/// Build the HTTP client used for catalog calls.
/// One client is shared so connections are pooled.
fn build_shared_http_client(catalog: &CatalogConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(catalog.request_timeout_seconds))
        .user_agent(catalog.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub anilist: Arc<AnilistClient>,

    pub catalog: Arc<dyn CatalogService>,

    pub recommendations: Arc<RecommendationService>,

    pub auth: Arc<dyn AuthService>,

    pub profiles: Arc<dyn ProfileService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(&config.catalog)?;

        let anilist = Arc::new(
            AnilistClient::with_shared_client(http_client, config.catalog.api_url.clone())
                .with_response_cache(store.clone(), config.catalog.response_cache_ttl_seconds),
        );

        let catalog: Arc<dyn CatalogService> = Arc::new(SeaOrmCatalogService::new(
            store.clone(),
            anilist.clone(),
            config.catalog.search_per_page,
        ));

        let recommendations = Arc::new(RecommendationService::new(
            store.clone(),
            anilist.clone(),
            config.recommendations.clone(),
        ));

        let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            TokenIssuer::new(&config.auth),
            config.security.clone(),
        ));

        let profiles: Arc<dyn ProfileService> = Arc::new(SeaOrmProfileService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            anilist,
            catalog,
            recommendations,
            auth,
            profiles,
        })
    }
}
