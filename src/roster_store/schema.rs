//! Database schema for roster.db.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const ARTISTS_TABLE_V1: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", SqlType::Text, non_null = true),
        sqlite_column!("name", SqlType::Text, non_null = true),
        sqlite_column!("uri", SqlType::Text),
        sqlite_column!("spotify_id", SqlType::Text),
    ],
    primary_key: &["id"],
    indices: &[("idx_artists_spotify_id", "spotify_id")],
};

pub const ROSTER_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[ARTISTS_TABLE_V1],
};
