//! Metrics ingestion job: snapshots Spotify metrics for resolved artists.

use crate::background_jobs::context::JobContext;
use crate::background_jobs::job::{BackgroundJob, JobError, JobSchedule};
use crate::ingest::MetricsIngestor;
use crate::spotify::SpotifyClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct MetricsIngestionJob {
    client: Arc<SpotifyClient>,
    batch_size: usize,
    interval: Duration,
}

impl MetricsIngestionJob {
    pub fn new(client: Arc<SpotifyClient>, batch_size: usize, interval: Duration) -> Self {
        Self {
            client,
            batch_size,
            interval,
        }
    }
}

impl BackgroundJob for MetricsIngestionJob {
    fn id(&self) -> &'static str {
        "metrics_ingestion"
    }

    fn name(&self) -> &'static str {
        "Metrics Ingestion"
    }

    fn description(&self) -> &'static str {
        "Snapshot follower and popularity metrics for resolved artists"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let ingestor = MetricsIngestor::new(
            Arc::clone(&self.client),
            Arc::clone(&ctx.roster_store),
            Arc::clone(&ctx.metrics_store),
            self.batch_size,
        );

        let report = ingestor
            .ingest_all()
            .map_err(|e| JobError::ExecutionFailed(format!("Ingestion failed: {}", e)))?;

        info!(
            "Ingestion complete: {} artists, {} null entries skipped, {}/{} batches ok, {} samples inserted",
            report.artists_processed,
            report.entries_skipped,
            report.batches_ok,
            report.batches_ok + report.batches_failed,
            report.samples_inserted
        );
        if report.batches_failed > 0 {
            warn!(
                "{} batches failed and will be retried next run",
                report.batches_failed
            );
        }
        Ok(())
    }
}
