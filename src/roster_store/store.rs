//! SQLite implementation of the roster store.

use super::schema::ROSTER_SCHEMA;
use super::{RosterArtist, RosterStore};
use crate::sqlite_persistence::ensure_schema;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteRosterStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRosterStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open roster db: {:?}", path))?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Arc::new(Mutex::new(Connection::open_in_memory()?)))
    }

    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = conn.lock().unwrap();
            ensure_schema(&conn, &ROSTER_SCHEMA)?;
        }
        Ok(Self { conn })
    }

    fn row_to_artist(row: &rusqlite::Row<'_>) -> rusqlite::Result<RosterArtist> {
        Ok(RosterArtist {
            id: row.get(0)?,
            name: row.get(1)?,
            uri: row.get(2)?,
            spotify_id: row.get(3)?,
        })
    }
}

impl RosterStore for SqliteRosterStore {
    fn upsert_artist(&self, id: &str, name: &str, uri: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO artists (id, name, uri) VALUES (?1, ?2, ?3)",
            params![id, name, uri],
        )
        .with_context(|| format!("Failed to upsert artist {}", id))?;
        Ok(())
    }

    fn unresolved(&self) -> Result<Vec<RosterArtist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, uri, spotify_id FROM artists WHERE spotify_id IS NULL ORDER BY id",
        )?;
        let artists = stmt
            .query_map([], Self::row_to_artist)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artists)
    }

    fn resolved(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, spotify_id FROM artists WHERE spotify_id IS NOT NULL ORDER BY id",
        )?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    fn set_spotify_id(&self, internal_id: &str, spotify_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE artists SET spotify_id = ?2 WHERE id = ?1",
            params![internal_id, spotify_id],
        )
        .with_context(|| format!("Failed to set spotify id for {}", internal_id))?;
        Ok(())
    }

    fn get_artist(&self, id: &str) -> Result<Option<RosterArtist>> {
        let conn = self.conn.lock().unwrap();
        let artist = conn
            .query_row(
                "SELECT id, name, uri, spotify_id FROM artists WHERE id = ?1",
                params![id],
                Self::row_to_artist,
            )
            .optional()?;
        Ok(artist)
    }

    fn artist_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM artists", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn resolved_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM artists WHERE spotify_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> SqliteRosterStore {
        SqliteRosterStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = make_store();
        store
            .upsert_artist("mc1", "Neon Dawn", Some("neon-dawn"))
            .unwrap();
        store
            .upsert_artist("mc1", "Neon Dawn", Some("neon-dawn"))
            .unwrap();
        assert_eq!(store.artist_count().unwrap(), 1);
    }

    #[test]
    fn test_reseed_does_not_clobber_resolution() {
        let store = make_store();
        store.upsert_artist("mc1", "Neon Dawn", None).unwrap();
        store.set_spotify_id("mc1", "sp42").unwrap();

        store.upsert_artist("mc1", "Neon Dawn", None).unwrap();

        let artist = store.get_artist("mc1").unwrap().unwrap();
        assert_eq!(artist.spotify_id, Some("sp42".to_string()));
    }

    #[test]
    fn test_unresolved_and_resolved_partition() {
        let store = make_store();
        store.upsert_artist("mc1", "Neon Dawn", None).unwrap();
        store.upsert_artist("mc2", "Glass Harbor", None).unwrap();
        store.set_spotify_id("mc1", "sp42").unwrap();

        let unresolved = store.unresolved().unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].id, "mc2");

        let resolved = store.resolved().unwrap();
        assert_eq!(resolved, vec![("mc1".to_string(), "sp42".to_string())]);
        assert_eq!(store.resolved_count().unwrap(), 1);
    }

    #[test]
    fn test_set_spotify_id_twice_is_noop() {
        let store = make_store();
        store.upsert_artist("mc1", "Neon Dawn", None).unwrap();
        store.set_spotify_id("mc1", "sp42").unwrap();
        store.set_spotify_id("mc1", "sp42").unwrap();

        let artist = store.get_artist("mc1").unwrap().unwrap();
        assert_eq!(artist.spotify_id, Some("sp42".to_string()));
        assert_eq!(store.resolved_count().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_artist_returns_none() {
        let store = make_store();
        assert!(store.get_artist("nope").unwrap().is_none());
    }

    #[test]
    fn test_listings_are_ordered_by_id() {
        let store = make_store();
        store.upsert_artist("mc3", "Third", None).unwrap();
        store.upsert_artist("mc1", "First", None).unwrap();
        store.upsert_artist("mc2", "Second", None).unwrap();

        let ids: Vec<String> = store.unresolved().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["mc1", "mc2", "mc3"]);
    }
}
