//! Artist resolution job: maps unresolved roster artists to Spotify IDs.
//!
//! Already-resolved artists are skipped entirely (only `unresolved()` is
//! walked), so the job is safe to re-run at any time. Per-artist failures are
//! logged and counted, never fatal; a broken credential exchange is.

use crate::background_jobs::context::JobContext;
use crate::background_jobs::job::{BackgroundJob, JobError, JobSchedule};
use crate::resolver::CatalogMembershipResolver;
use crate::spotify::ProviderError;
use std::time::Duration;
use tracing::{info, warn};

pub struct ArtistResolutionJob {
    resolver: CatalogMembershipResolver,
    interval: Duration,
}

impl ArtistResolutionJob {
    pub fn new(resolver: CatalogMembershipResolver, interval: Duration) -> Self {
        Self { resolver, interval }
    }
}

impl BackgroundJob for ArtistResolutionJob {
    fn id(&self) -> &'static str {
        "artist_resolution"
    }

    fn name(&self) -> &'static str {
        "Artist Resolution"
    }

    fn description(&self) -> &'static str {
        "Resolve unmapped roster artists to Spotify identities"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let unresolved = ctx
            .roster_store
            .unresolved()
            .map_err(|e| JobError::ExecutionFailed(format!("Failed to list artists: {}", e)))?;

        let total = unresolved.len();
        info!("Resolving {} unmapped artists", total);

        let mut resolved = 0u32;
        let mut unmatched = 0u32;
        let mut failed = 0u32;

        for (idx, artist) in unresolved.iter().enumerate() {
            if ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }

            match self.resolver.resolve(&artist.id, &artist.name) {
                Ok(Some(spotify_id)) => {
                    info!("[{}/{}] '{}' -> {}", idx + 1, total, artist.name, spotify_id);
                    if let Err(e) = ctx.roster_store.set_spotify_id(&artist.id, &spotify_id) {
                        warn!("Failed to store mapping for {}: {}", artist.id, e);
                        failed += 1;
                    } else {
                        resolved += 1;
                    }
                }
                Ok(None) => {
                    info!("[{}/{}] No match for '{}'", idx + 1, total, artist.name);
                    unmatched += 1;
                }
                Err(e @ ProviderError::Auth(_)) => {
                    // Credentials are broken for the whole run, not this artist.
                    return Err(JobError::ExecutionFailed(e.to_string()));
                }
                Err(e) => {
                    warn!(
                        "[{}/{}] Resolution failed for '{}': {}",
                        idx + 1,
                        total,
                        artist.name,
                        e
                    );
                    failed += 1;
                }
            }
        }

        info!(
            "Resolution complete: {} resolved, {} unmatched, {} failed",
            resolved, unmatched, failed
        );
        Ok(())
    }
}
