//! Database schema for metrics.db.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const METRICS_TABLE_V1: Table = Table {
    name: "metrics",
    columns: &[
        sqlite_column!("artist_id", SqlType::Text, non_null = true),
        sqlite_column!("source", SqlType::Text, non_null = true),
        sqlite_column!("metric", SqlType::Text, non_null = true),
        sqlite_column!("ts", SqlType::Integer, non_null = true),
        sqlite_column!("val", SqlType::Real, non_null = true),
    ],
    primary_key: &["artist_id", "source", "metric", "ts"],
    indices: &[("idx_metrics_artist", "artist_id")],
};

pub const METRICS_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[METRICS_TABLE_V1],
};
