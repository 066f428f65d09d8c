//! Roster seeding job: mirrors the label's public roster into the artists
//! table. Inserts are idempotent and existing rows are never touched, so
//! re-syncing cannot clobber a resolved identity.

use crate::background_jobs::context::JobContext;
use crate::background_jobs::job::{BackgroundJob, JobError, JobSchedule};
use crate::catalog_client::CatalogClient;
use std::time::Duration;
use tracing::info;

pub struct RosterSyncJob {
    catalog: CatalogClient,
    interval: Duration,
}

impl RosterSyncJob {
    pub fn new(catalog: CatalogClient, interval: Duration) -> Self {
        Self { catalog, interval }
    }
}

impl BackgroundJob for RosterSyncJob {
    fn id(&self) -> &'static str {
        "roster_sync"
    }

    fn name(&self) -> &'static str {
        "Roster Sync"
    }

    fn description(&self) -> &'static str {
        "Mirror the label roster into the local artists table"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let artists = self
            .catalog
            .fetch_all()
            .map_err(|e| JobError::ExecutionFailed(format!("Roster fetch failed: {}", e)))?;

        info!("Fetched {} roster artists", artists.len());

        for artist in &artists {
            if ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            ctx.roster_store
                .upsert_artist(&artist.id, &artist.name, artist.uri.as_deref())
                .map_err(|e| {
                    JobError::ExecutionFailed(format!(
                        "Failed to store artist {}: {}",
                        artist.id, e
                    ))
                })?;
        }

        info!(
            "Roster sync complete: {} artists in store",
            ctx.roster_store.artist_count().unwrap_or(0)
        );
        Ok(())
    }
}
