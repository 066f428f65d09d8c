//! labelpulse library
//!
//! Resolves a label's artist roster to Spotify identities and snapshots
//! popularity metrics into a local time-series store. This library exposes
//! the internal modules for the e2e test suites and potential reuse.

pub mod background_jobs;
pub mod catalog_client;
pub mod config;
pub mod ingest;
pub mod metrics_store;
pub mod resolver;
pub mod roster_store;
pub mod spotify;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use ingest::{IngestReport, MetricsIngestor};
pub use metrics_store::{MetricsStore, SqliteMetricsStore};
pub use resolver::{CatalogMembershipResolver, ManualOverrides, ResolverConfig};
pub use roster_store::{RosterStore, SqliteRosterStore};
pub use spotify::{ProviderError, SpotifyClient, TokenCache};
