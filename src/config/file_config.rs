use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub cache_dir: Option<String>,
    pub overrides_file: Option<String>,
    pub label: Option<String>,
    pub market: Option<String>,
    pub batch_size: Option<usize>,
    pub rate_limit_qps: Option<f64>,
    pub search_limit: Option<u32>,
    pub roster_sync_interval_hours: Option<u64>,
    pub resolve_interval_hours: Option<u64>,
    pub ingest_interval_mins: Option<u64>,

    // Provider endpoints and credentials
    pub spotify: Option<SpotifyConfig>,
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SpotifyConfig {
    pub api_base: Option<String>,
    pub token_url: Option<String>,
    /// Credentials here take precedence over the environment.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
