//! Append-only time-series store for artist popularity metrics.

mod schema;
mod store;

pub use store::SqliteMetricsStore;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Where a metric sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    Spotify,
}

impl MetricSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSource::Spotify => "spotify",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "spotify" => Some(MetricSource::Spotify),
            _ => None,
        }
    }
}

/// What a metric sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Followers,
    Popularity,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Followers => "followers",
            MetricKind::Popularity => "popularity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "followers" => Some(MetricKind::Followers),
            "popularity" => Some(MetricKind::Popularity),
            _ => None,
        }
    }
}

/// One immutable time-stamped measurement for a roster artist.
///
/// The primary key is (artist, source, metric, ts); a sample is never
/// updated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub artist_id: String,
    pub source: MetricSource,
    pub metric: MetricKind,
    /// Ingestion-time Unix timestamp in seconds.
    pub ts: i64,
    pub value: f64,
}

pub trait MetricsStore: Send + Sync {
    /// Bulk-insert samples inside one transaction. Rows whose primary key
    /// already exists are silently dropped, making duplicate upserts a no-op.
    /// Returns the number of rows actually inserted.
    fn upsert_samples(&self, samples: &[MetricSample]) -> Result<usize>;

    fn sample_count(&self) -> Result<usize>;

    /// Most recent sample per metric for one artist.
    fn latest_for_artist(&self, artist_id: &str) -> Result<Vec<MetricSample>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_enums_roundtrip() {
        assert_eq!(MetricSource::from_str("spotify"), Some(MetricSource::Spotify));
        assert_eq!(MetricSource::from_str("deezer"), None);
        assert_eq!(MetricKind::from_str(MetricKind::Followers.as_str()), Some(MetricKind::Followers));
        assert_eq!(MetricKind::from_str(MetricKind::Popularity.as_str()), Some(MetricKind::Popularity));
        assert_eq!(MetricKind::from_str("plays"), None);
    }
}
