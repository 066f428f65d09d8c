use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use labelpulse::background_jobs::jobs::{
    ArtistResolutionJob, MetricsIngestionJob, RosterSyncJob,
};
use labelpulse::background_jobs::{BackgroundJob, JobContext, JobScheduler};
use labelpulse::catalog_client::CatalogClient;
use labelpulse::config::{AppConfig, CliConfig, FileConfig};
use labelpulse::metrics_store::{MetricsStore, SqliteMetricsStore};
use labelpulse::resolver::{CatalogMembershipResolver, ManualOverrides, ResolverConfig};
use labelpulse::roster_store::{RosterStore, SqliteRosterStore};
use labelpulse::spotify::{
    RequestThrottler, ResponseCache, SpotifyClient, TokenBucket, TokenCache,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(
    name = "labelpulse",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")),
    about = "Resolve a label roster against Spotify and snapshot popularity metrics"
)]
struct CliArgs {
    /// Directory holding the roster and metrics SQLite databases.
    #[clap(long, value_parser = parse_path)]
    db_dir: Option<PathBuf>,

    /// Path to a TOML config file; its values override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    config: Option<PathBuf>,

    /// Directory for the on-disk response and name caches.
    #[clap(long, value_parser = parse_path)]
    cache_dir: Option<PathBuf>,

    /// JSON file with manual internal-id to Spotify-id mappings.
    #[clap(long, value_parser = parse_path)]
    overrides_file: Option<PathBuf>,

    /// Label name a candidate's release must carry to count as a match.
    #[clap(long, default_value = "Monstercat")]
    label: String,

    /// Market passed to Spotify search and release listings.
    #[clap(long, default_value = "US")]
    market: String,

    /// Artists per bulk metrics fetch (Spotify allows at most 50).
    #[clap(long, default_value_t = 50)]
    batch_size: usize,

    /// Global ceiling on Spotify requests per second.
    #[clap(long, default_value_t = 1.0)]
    rate_limit_qps: f64,

    /// Search candidates to consider per artist (1 = strict).
    #[clap(long, default_value_t = 1)]
    search_limit: u32,

    /// Hours between roster sync runs in daemon mode.
    #[clap(long, default_value_t = 24)]
    roster_sync_interval_hours: u64,

    /// Hours between resolution runs in daemon mode.
    #[clap(long, default_value_t = 12)]
    resolve_interval_hours: u64,

    /// Minutes between metric ingestion runs in daemon mode.
    #[clap(long, default_value_t = 60)]
    ingest_interval_mins: u64,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mirror the label roster into the local artists table, once.
    Seed,
    /// Resolve unmapped roster artists to Spotify identities, once.
    Resolve,
    /// Fetch and store metrics for every resolved artist, once.
    Ingest,
    /// Run all jobs on their configured intervals until interrupted.
    Run,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        cache_dir: cli_args.cache_dir.clone(),
        overrides_file: cli_args.overrides_file.clone(),
        label: cli_args.label.clone(),
        market: cli_args.market.clone(),
        batch_size: cli_args.batch_size,
        rate_limit_qps: cli_args.rate_limit_qps,
        search_limit: cli_args.search_limit,
        roster_sync_interval_hours: cli_args.roster_sync_interval_hours,
        resolve_interval_hours: cli_args.resolve_interval_hours,
        ingest_interval_mins: cli_args.ingest_interval_mins,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let roster_store: Arc<dyn RosterStore> =
        Arc::new(SqliteRosterStore::open(&config.roster_db_path())?);
    let metrics_store: Arc<dyn MetricsStore> =
        Arc::new(SqliteMetricsStore::open(&config.metrics_db_path())?);

    let tokens = Arc::new(TokenCache::new(
        &config.spotify_token_url,
        &config.spotify_client_id,
        &config.spotify_client_secret,
    )?);
    let throttler: Arc<dyn RequestThrottler> = Arc::new(TokenBucket::new(config.rate_limit_qps));
    let cache = ResponseCache::new(&config.cache_dir)?;
    let client = Arc::new(SpotifyClient::new(
        config.spotify_api_base.clone(),
        tokens,
        throttler,
        cache,
    )?);

    let overrides = match &config.overrides_file {
        Some(path) => ManualOverrides::load(path)?,
        None => ManualOverrides::empty(),
    };
    info!("Loaded {} manual overrides", overrides.len());

    let resolver = CatalogMembershipResolver::new(
        Arc::clone(&client),
        ResolverConfig {
            label_name: config.label.clone(),
            search_limit: config.search_limit,
            market: config.market.clone(),
        },
        overrides,
        &config.cache_dir,
    )?;

    let catalog = CatalogClient::new(config.catalog_api_base.clone(), config.catalog_timeout_secs)?;

    let shutdown_token = CancellationToken::new();
    let context = JobContext::new(shutdown_token.clone(), roster_store, metrics_store);

    let roster_job = RosterSyncJob::new(
        catalog,
        Duration::from_secs(config.roster_sync_interval_hours * 3600),
    );
    let resolve_job = ArtistResolutionJob::new(
        resolver,
        Duration::from_secs(config.resolve_interval_hours * 3600),
    );
    let ingest_job = MetricsIngestionJob::new(
        Arc::clone(&client),
        config.batch_size,
        Duration::from_secs(config.ingest_interval_mins * 60),
    );

    match cli_args.command {
        Command::Seed => run_job_once(&roster_job, &context),
        Command::Resolve => run_job_once(&resolve_job, &context),
        Command::Ingest => run_job_once(&ingest_job, &context),
        Command::Run => {
            let mut scheduler = JobScheduler::new(context, shutdown_token.clone());
            scheduler.register_job(Arc::new(roster_job));
            scheduler.register_job(Arc::new(resolve_job));
            scheduler.register_job(Arc::new(ingest_job));

            let ctrlc_token = shutdown_token.clone();
            ctrlc::set_handler(move || {
                info!("Received interrupt, shutting down");
                ctrlc_token.cancel();
            })
            .context("Failed to install interrupt handler")?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(scheduler.run());
            Ok(())
        }
    }
}

fn run_job_once(job: &dyn BackgroundJob, ctx: &JobContext) -> Result<()> {
    info!("Running job: {}", job.name());
    job.execute(ctx)
        .map_err(|e| anyhow::anyhow!("{} failed: {}", job.name(), e))
}
