//! SQLite implementation of the metrics store.

use super::schema::METRICS_SCHEMA;
use super::{MetricKind, MetricSample, MetricSource, MetricsStore};
use crate::sqlite_persistence::ensure_schema;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteMetricsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMetricsStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open metrics db: {:?}", path))?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Arc::new(Mutex::new(Connection::open_in_memory()?)))
    }

    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = conn.lock().unwrap();
            ensure_schema(&conn, &METRICS_SCHEMA)?;
        }
        Ok(Self { conn })
    }

    fn row_to_sample(row: &rusqlite::Row<'_>) -> rusqlite::Result<MetricSample> {
        let source_str: String = row.get(1)?;
        let metric_str: String = row.get(2)?;
        Ok(MetricSample {
            artist_id: row.get(0)?,
            source: MetricSource::from_str(&source_str).unwrap_or(MetricSource::Spotify),
            metric: MetricKind::from_str(&metric_str).unwrap_or(MetricKind::Followers),
            ts: row.get(3)?,
            value: row.get(4)?,
        })
    }
}

impl MetricsStore for SqliteMetricsStore {
    fn upsert_samples(&self, samples: &[MetricSample]) -> Result<usize> {
        if samples.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO metrics (artist_id, source, metric, ts, val)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for sample in samples {
                inserted += stmt.execute(params![
                    sample.artist_id,
                    sample.source.as_str(),
                    sample.metric.as_str(),
                    sample.ts,
                    sample.value,
                ])?;
            }
        }
        tx.commit().context("Failed to commit metric samples")?;
        Ok(inserted)
    }

    fn sample_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM metrics", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn latest_for_artist(&self, artist_id: &str) -> Result<Vec<MetricSample>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT artist_id, source, metric, ts, val FROM metrics m
             WHERE artist_id = ?1
               AND ts = (SELECT MAX(ts) FROM metrics
                         WHERE artist_id = m.artist_id
                           AND source = m.source
                           AND metric = m.metric)
             ORDER BY metric",
        )?;
        let samples = stmt
            .query_map(params![artist_id], Self::row_to_sample)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(samples)
    }
}
