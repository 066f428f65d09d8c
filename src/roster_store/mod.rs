//! Persistent roster of label artists and their resolved Spotify identities.

mod schema;
mod store;

pub use store::SqliteRosterStore;

use anyhow::Result;

/// A roster artist as stored in the artists table.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterArtist {
    pub id: String,
    pub name: String,
    pub uri: Option<String>,
    pub spotify_id: Option<String>,
}

/// Store for the artist roster and its Spotify identity mapping.
///
/// Rows are created by roster seeding and never deleted here; resolution only
/// fills in `spotify_id`.
pub trait RosterStore: Send + Sync {
    /// Insert an artist if not already present. Existing rows are left
    /// untouched, so re-seeding never clobbers a resolved identity.
    fn upsert_artist(&self, id: &str, name: &str, uri: Option<&str>) -> Result<()>;

    /// Artists with no Spotify identity yet, in roster-id order.
    fn unresolved(&self) -> Result<Vec<RosterArtist>>;

    /// (internal id, Spotify id) pairs for every resolved artist, in
    /// roster-id order.
    fn resolved(&self) -> Result<Vec<(String, String)>>;

    /// Record an artist's Spotify identity. Setting the same value again is
    /// an observable no-op.
    fn set_spotify_id(&self, internal_id: &str, spotify_id: &str) -> Result<()>;

    fn get_artist(&self, id: &str) -> Result<Option<RosterArtist>>;

    fn artist_count(&self) -> Result<usize>;

    fn resolved_count(&self) -> Result<usize>;
}
