pub mod artist_resolution;
pub mod metrics_ingestion;
pub mod roster_sync;

pub use artist_resolution::ArtistResolutionJob;
pub use metrics_ingestion::MetricsIngestionJob;
pub use roster_sync::RosterSyncJob;
