//! Wire types for the Spotify Web API endpoints labelpulse consumes.
//!
//! Fields the provider may omit are `Option`s; callers decide what a missing
//! value means for them.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: Option<ArtistSearchPage>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchPage {
    #[serde(default)]
    pub items: Vec<ArtistCandidate>,
}

/// One ranked candidate from the artist search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCandidate {
    pub id: String,
    pub name: String,
}

/// Response of the bulk-artists endpoint: entries are aligned to the
/// requested ID order and `null` for IDs the provider does not know.
#[derive(Debug, Deserialize)]
pub struct BulkArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Option<ArtistDetail>>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub followers: Option<Followers>,
    pub popularity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Followers {
    pub total: Option<i64>,
}

/// One page of an artist's releases; `next` is a full URL or null.
#[derive(Debug, Deserialize)]
pub struct AlbumsPage {
    #[serde(default)]
    pub items: Vec<AlbumRef>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumDetail {
    pub label: Option<String>,
}
