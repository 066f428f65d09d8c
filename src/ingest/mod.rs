//! Batch ingestion of Spotify metrics for resolved roster artists.

use crate::metrics_store::{MetricKind, MetricSample, MetricSource, MetricsStore};
use crate::roster_store::RosterStore;
use crate::spotify::models::BulkArtistsResponse;
use crate::spotify::{ProviderError, SpotifyClient};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Spotify's bulk-artists endpoint accepts at most 50 IDs per call.
pub const MAX_BATCH_SIZE: usize = 50;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Artists whose metrics were fetched and stored.
    pub artists_processed: usize,
    /// Bulk-response entries that came back null and were skipped.
    pub entries_skipped: usize,
    pub batches_ok: usize,
    pub batches_failed: usize,
    /// Samples actually written (duplicates absorbed by the store excluded).
    pub samples_inserted: usize,
}

pub struct MetricsIngestor {
    client: Arc<SpotifyClient>,
    roster: Arc<dyn RosterStore>,
    metrics: Arc<dyn MetricsStore>,
    batch_size: usize,
}

impl MetricsIngestor {
    pub fn new(
        client: Arc<SpotifyClient>,
        roster: Arc<dyn RosterStore>,
        metrics: Arc<dyn MetricsStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            client,
            roster,
            metrics,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    /// Fetch current metrics for every resolved artist and persist them.
    ///
    /// A batch whose bulk fetch fails is recorded in the report and skipped;
    /// the remaining batches still run, so a partial failure never aborts the
    /// run. An auth failure does abort: credentials are broken for every
    /// batch alike.
    pub fn ingest_all(&self) -> Result<IngestReport> {
        let resolved = self.roster.resolved()?;
        let mut report = IngestReport::default();

        if resolved.is_empty() {
            info!("No resolved artists to ingest. Have you seeded and resolved the roster?");
            return Ok(report);
        }

        let total_batches = resolved.len().div_ceil(self.batch_size);
        info!(
            "Ingesting metrics for {} artists in {} batches of up to {}",
            resolved.len(),
            total_batches,
            self.batch_size
        );

        for (batch_num, batch) in resolved.chunks(self.batch_size).enumerate() {
            match self.ingest_batch(batch) {
                Ok((processed, skipped, inserted)) => {
                    report.artists_processed += processed;
                    report.entries_skipped += skipped;
                    report.samples_inserted += inserted;
                    report.batches_ok += 1;
                    info!(
                        "Batch {}/{}: {} artists, {} samples inserted",
                        batch_num + 1,
                        total_batches,
                        processed,
                        inserted
                    );
                }
                Err(e) => {
                    if matches!(
                        e.downcast_ref::<ProviderError>(),
                        Some(ProviderError::Auth(_))
                    ) {
                        return Err(e);
                    }
                    warn!("Batch {}/{} failed: {}", batch_num + 1, total_batches, e);
                    report.batches_failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Fetch one batch and flush its samples. All samples of the batch share
    /// one ingestion-time timestamp; the provider supplies none.
    fn ingest_batch(&self, batch: &[(String, String)]) -> Result<(usize, usize, usize)> {
        let ids: Vec<&str> = batch.iter().map(|(_, spotify_id)| spotify_id.as_str()).collect();
        let params = vec![("ids".to_string(), ids.join(","))];
        let response: BulkArtistsResponse = self.client.get_json("/v1/artists", &params)?;

        if response.artists.len() != batch.len() {
            warn!(
                "Bulk response has {} entries for {} requested IDs",
                response.artists.len(),
                batch.len()
            );
        }

        let ts = Utc::now().timestamp();
        let mut samples = Vec::with_capacity(batch.len() * 2);
        let mut processed = 0usize;
        let mut skipped = 0usize;

        // Zip against the request so a null entry is attributable to its ID.
        for ((internal_id, requested_id), entry) in
            batch.iter().zip(response.artists.into_iter())
        {
            let Some(artist) = entry else {
                warn!("Spotify returned null for ID {}, skipping", requested_id);
                skipped += 1;
                continue;
            };

            if artist.id != *requested_id {
                warn!(
                    "Spotify returned ID {} for requested {}",
                    artist.id, requested_id
                );
            }

            let followers = artist.followers.and_then(|f| f.total).unwrap_or(0);
            let popularity = artist.popularity.unwrap_or(0);

            samples.push(MetricSample {
                artist_id: internal_id.clone(),
                source: MetricSource::Spotify,
                metric: MetricKind::Followers,
                ts,
                value: followers as f64,
            });
            samples.push(MetricSample {
                artist_id: internal_id.clone(),
                source: MetricSource::Spotify,
                metric: MetricKind::Popularity,
                ts,
                value: popularity as f64,
            });
            processed += 1;
        }

        let inserted = self.metrics.upsert_samples(&samples)?;
        Ok((processed, skipped, inserted))
    }
}
