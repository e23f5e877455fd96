use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "ANIREC_JWT_SECRET";

/// Environment variable that overrides `general.database_path`.
pub const DATABASE_URL_ENV: &str = "ANIREC_DATABASE_URL";

/// Upper bound for every configured lifetime: ten years.
const MAX_DAYS: i64 = 3_650;
const MAX_HOURS: i64 = MAX_DAYS * 24;
const MAX_MINUTES: i64 = MAX_HOURS * 60;
const MAX_SECONDS: u64 = 3_650 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub catalog: CatalogConfig,

    pub recommendations: RecommendationConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/anirec.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// GraphQL endpoint every catalog query is POSTed to.
    pub api_url: String,

    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    /// Lifetime of cached catalog responses in seconds (default: 3600).
    /// Set to 0 to disable response caching.
    pub response_cache_ttl_seconds: u64,

    /// Page size used for search queries (default: 10)
    pub search_per_page: i32,

    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: "https://graphql.anilist.co".to_string(),
            request_timeout_seconds: 10,
            response_cache_ttl_seconds: 60 * 60,
            search_per_page: 10,
            user_agent: "anirec/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Age after which a user's cached recommendations are rebuilt.
    pub freshness_hours: i64,

    /// Maximum number of recommendations returned per request.
    pub max_results: usize,

    /// Number of candidates requested from the catalog on refresh.
    pub fetch_size: i32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            freshness_hours: 24,
            max_results: 10,
            fetch_size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens. Overridden by `ANIREC_JWT_SECRET`.
    pub jwt_secret: String,

    pub access_token_minutes: i64,

    pub refresh_token_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_minutes: 5,
            refresh_token_days: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            recommendations: RecommendationConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config from `explicit` if given, otherwise from the first
    /// existing default location, then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            Self::load_from_path(path)?
        } else {
            Self::load_from_default_paths()?
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from_default_paths() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV)
            && !secret.is_empty()
        {
            self.auth.jwt_secret = secret;
        }

        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.is_empty()
        {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("anirec").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".anirec").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config with a freshly generated token secret.
    /// Returns `false` when a config file already exists.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            return Ok(false);
        }

        let mut config = Self::default();
        config.auth.jwt_secret = generate_secret();
        config.save_to_path(&path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.api_url.trim().is_empty() {
            anyhow::bail!("catalog.api_url cannot be empty");
        }

        if self.catalog.request_timeout_seconds == 0 {
            anyhow::bail!("catalog.request_timeout_seconds must be > 0");
        }

        if self.catalog.search_per_page <= 0 || self.recommendations.fetch_size <= 0 {
            anyhow::bail!("catalog page sizes must be > 0");
        }

        if self.recommendations.max_results == 0 {
            anyhow::bail!("recommendations.max_results must be > 0");
        }

        if !(1..=MAX_HOURS).contains(&self.recommendations.freshness_hours) {
            anyhow::bail!("recommendations.freshness_hours must be between 1 and {MAX_HOURS}");
        }

        if self.catalog.response_cache_ttl_seconds > MAX_SECONDS {
            anyhow::bail!("catalog.response_cache_ttl_seconds must be at most {MAX_SECONDS}");
        }

        if !(1..=MAX_MINUTES).contains(&self.auth.access_token_minutes) {
            anyhow::bail!("auth.access_token_minutes must be between 1 and {MAX_MINUTES}");
        }

        if !(1..=MAX_DAYS).contains(&self.auth.refresh_token_days) {
            anyhow::bail!("auth.refresh_token_days must be between 1 and {MAX_DAYS}");
        }

        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!(
                "auth.jwt_secret is empty; run `anirec init` or set {JWT_SECRET_ENV}"
            );
        }

        Ok(())
    }
}

/// Random 64-character hex secret.
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
