mod file_config;

pub use file_config::{CatalogConfig, FileConfig, SpotifyConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_CATALOG_API_BASE: &str = "https://player.monstercat.app";

/// CLI arguments subject to config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub overrides_file: Option<PathBuf>,
    pub label: String,
    pub market: String,
    pub batch_size: usize,
    pub rate_limit_qps: f64,
    pub search_limit: u32,
    pub roster_sync_interval_hours: u64,
    pub resolve_interval_hours: u64,
    pub ingest_interval_mins: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            cache_dir: None,
            overrides_file: None,
            label: "Monstercat".to_string(),
            market: "US".to_string(),
            batch_size: 50,
            rate_limit_qps: 1.0,
            search_limit: 1,
            roster_sync_interval_hours: 24,
            resolve_interval_hours: 12,
            ingest_interval_mins: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub overrides_file: Option<PathBuf>,
    pub label: String,
    pub market: String,
    pub batch_size: usize,
    pub rate_limit_qps: f64,
    pub search_limit: u32,
    pub roster_sync_interval_hours: u64,
    pub resolve_interval_hours: u64,
    pub ingest_interval_mins: u64,

    pub spotify_api_base: String,
    pub spotify_token_url: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,

    pub catalog_api_base: String,
    pub catalog_timeout_secs: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, optional TOML file config and
    /// the environment. TOML values override CLI values where present;
    /// credentials come from the `[spotify]` section or, failing that, the
    /// `SPOTIFY_CLIENT_ID`/`SPOTIFY_CLIENT_SECRET` environment variables.
    /// Missing required values are a startup error.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let cache_dir = file
            .cache_dir
            .map(PathBuf::from)
            .or_else(|| cli.cache_dir.clone())
            .unwrap_or_else(|| db_dir.join("cache"));

        let overrides_file = file
            .overrides_file
            .map(PathBuf::from)
            .or_else(|| cli.overrides_file.clone());
        if let Some(path) = &overrides_file {
            if !path.exists() {
                bail!("Overrides file does not exist: {:?}", path);
            }
        }

        let spotify = file.spotify.unwrap_or_default();
        let spotify_client_id = spotify
            .client_id
            .or_else(|| std::env::var("SPOTIFY_CLIENT_ID").ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Spotify client id missing: set SPOTIFY_CLIENT_ID or [spotify] client_id"
                )
            })?;
        let spotify_client_secret = spotify
            .client_secret
            .or_else(|| std::env::var("SPOTIFY_CLIENT_SECRET").ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Spotify client secret missing: set SPOTIFY_CLIENT_SECRET or [spotify] client_secret"
                )
            })?;

        let batch_size = file.batch_size.unwrap_or(cli.batch_size);
        if batch_size == 0 || batch_size > 50 {
            bail!("batch_size must be between 1 and 50, got {}", batch_size);
        }

        let rate_limit_qps = file.rate_limit_qps.unwrap_or(cli.rate_limit_qps);
        if rate_limit_qps <= 0.0 {
            bail!("rate_limit_qps must be positive, got {}", rate_limit_qps);
        }

        let search_limit = file.search_limit.unwrap_or(cli.search_limit);
        if search_limit == 0 || search_limit > 10 {
            bail!("search_limit must be between 1 and 10, got {}", search_limit);
        }

        let catalog = file.catalog.unwrap_or_default();

        Ok(Self {
            db_dir,
            cache_dir,
            overrides_file,
            label: file.label.unwrap_or_else(|| cli.label.clone()),
            market: file.market.unwrap_or_else(|| cli.market.clone()),
            batch_size,
            rate_limit_qps,
            search_limit,
            roster_sync_interval_hours: file
                .roster_sync_interval_hours
                .unwrap_or(cli.roster_sync_interval_hours),
            resolve_interval_hours: file
                .resolve_interval_hours
                .unwrap_or(cli.resolve_interval_hours),
            ingest_interval_mins: file.ingest_interval_mins.unwrap_or(cli.ingest_interval_mins),
            spotify_api_base: spotify
                .api_base
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_BASE.to_string()),
            spotify_token_url: spotify
                .token_url
                .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
            spotify_client_id,
            spotify_client_secret,
            catalog_api_base: catalog
                .api_base
                .unwrap_or_else(|| DEFAULT_CATALOG_API_BASE.to_string()),
            catalog_timeout_secs: catalog.timeout_secs.unwrap_or(30),
        })
    }

    pub fn roster_db_path(&self) -> PathBuf {
        self.db_dir.join("roster.db")
    }

    pub fn metrics_db_path(&self) -> PathBuf {
        self.db_dir.join("metrics.db")
    }
}
