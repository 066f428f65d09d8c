//! Artist identity resolution against Spotify.
//!
//! Same-named artists are disambiguated with a catalog-membership proof: a
//! search candidate only counts as a match if one of its releases carries the
//! label's name. Candidates are considered in the order the provider ranks
//! them; there is no secondary scoring.
//!
//! Resolution order per artist:
//! 1. manual override (no network)
//! 2. persisted name cache of previous positive matches (no network)
//! 3. exact quoted search + case-insensitive name equality + membership proof

mod overrides;

pub use overrides::ManualOverrides;

use crate::spotify::models::{AlbumDetail, AlbumsPage, ArtistCandidate, ArtistSearchResponse};
use crate::spotify::{ProviderError, SpotifyClient};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Page size used when walking a candidate's releases.
const RELEASES_PAGE_SIZE: u32 = 50;

const NAME_CACHE_FILE: &str = "matched_artists.json";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Label name a release must carry for the membership proof to pass.
    pub label_name: String,
    /// Candidates requested from search (1 = strict, at most 10).
    pub search_limit: u32,
    /// Market passed to search and release listings.
    pub market: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            label_name: "Monstercat".to_string(),
            search_limit: 1,
            market: "US".to_string(),
        }
    }
}

/// Persisted display-name -> Spotify-id cache of positive resolutions.
///
/// Never invalidated automatically; delete the file to force re-resolution.
struct NameCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl NameCache {
    fn load(path: PathBuf) -> Self {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().unwrap().get(name).cloned()
    }

    fn insert(&self, name: &str, spotify_id: &str) -> std::io::Result<()> {
        let snapshot = {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(name.to_string(), spotify_id.to_string());
            entries.clone()
        };
        let content = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, content)
    }
}

pub struct CatalogMembershipResolver {
    client: Arc<SpotifyClient>,
    config: ResolverConfig,
    overrides: ManualOverrides,
    name_cache: NameCache,
}

impl CatalogMembershipResolver {
    pub fn new(
        client: Arc<SpotifyClient>,
        config: ResolverConfig,
        overrides: ManualOverrides,
        cache_dir: &Path,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(cache_dir)?;
        Ok(Self {
            client,
            config,
            overrides,
            name_cache: NameCache::load(cache_dir.join(NAME_CACHE_FILE)),
        })
    }

    /// Resolve a roster artist to a Spotify ID.
    ///
    /// `Ok(None)` means no candidate passed both the exact-name check and the
    /// membership proof; that is a normal outcome, not an error. An `Auth`
    /// error means credentials are broken for the whole run.
    pub fn resolve(
        &self,
        internal_id: &str,
        display_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        if let Some(spotify_id) = self.overrides.get(internal_id) {
            debug!(
                "'{}' ({}) manually mapped to {}",
                display_name, internal_id, spotify_id
            );
            return Ok(Some(spotify_id.to_string()));
        }

        if let Some(spotify_id) = self.name_cache.get(display_name) {
            debug!("'{}' resolved from name cache: {}", display_name, spotify_id);
            return Ok(Some(spotify_id));
        }

        let candidates = self.search_candidates(display_name, self.config.search_limit)?;
        if candidates.is_empty() {
            info!("No search results for '{}'", display_name);
            return Ok(None);
        }

        for candidate in candidates {
            if !candidate.name.eq_ignore_ascii_case(display_name) {
                continue;
            }
            if self.has_label_release(&candidate.id) {
                if let Err(e) = self.name_cache.insert(display_name, &candidate.id) {
                    warn!("Failed to persist name cache: {}", e);
                }
                return Ok(Some(candidate.id));
            }
            info!(
                "'{}' candidate {} has no {} release, skipping",
                display_name, candidate.id, self.config.label_name
            );
        }

        Ok(None)
    }

    /// Escape hatch: first candidate with a label release, without requiring
    /// the name to match exactly. Never consulted by the resolution job and
    /// never written to the name cache; invoke explicitly for diagnostics.
    pub fn resolve_fuzzy(&self, display_name: &str) -> Result<Option<String>, ProviderError> {
        let candidates = self.search_candidates(display_name, 10)?;
        for candidate in candidates {
            if self.has_label_release(&candidate.id) {
                return Ok(Some(candidate.id));
            }
        }
        Ok(None)
    }

    fn search_candidates(
        &self,
        display_name: &str,
        limit: u32,
    ) -> Result<Vec<ArtistCandidate>, ProviderError> {
        let params = vec![
            ("q".to_string(), format!("artist:\"{}\"", display_name)),
            ("type".to_string(), "artist".to_string()),
            ("limit".to_string(), limit.to_string()),
            ("market".to_string(), self.config.market.clone()),
        ];
        let response: ArtistSearchResponse = self.client.get_json_cached("/v1/search", &params)?;
        Ok(response.artists.map(|page| page.items).unwrap_or_default())
    }

    /// Walk the candidate's albums and singles looking for a release whose
    /// label contains the configured label name. A provider error mid-walk
    /// fails the proof for this candidate rather than the whole run; an
    /// unreadable single album is skipped.
    fn has_label_release(&self, artist_id: &str) -> bool {
        let label_needle = self.config.label_name.to_lowercase();
        let first_params = vec![
            ("include_groups".to_string(), "album,single".to_string()),
            ("limit".to_string(), RELEASES_PAGE_SIZE.to_string()),
            ("market".to_string(), self.config.market.clone()),
        ];

        let mut page: AlbumsPage = match self
            .client
            .get_json_cached(&format!("/v1/artists/{}/albums", artist_id), &first_params)
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch releases for {}: {}", artist_id, e);
                return false;
            }
        };

        loop {
            for album in &page.items {
                let detail: AlbumDetail = match self
                    .client
                    .get_json_cached(&format!("/v1/albums/{}", album.id), &[])
                {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!("Failed to fetch album {}: {}", album.id, e);
                        continue;
                    }
                };

                let label = detail.label.unwrap_or_default();
                if label.to_lowercase().contains(&label_needle) {
                    return true;
                }
            }

            match page.next {
                Some(next_url) => {
                    page = match self.client.get_json_cached(&next_url, &[]) {
                        Ok(page) => page,
                        Err(e) => {
                            warn!("Failed to fetch release page for {}: {}", artist_id, e);
                            return false;
                        }
                    };
                }
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_name_cache_roundtrip_and_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(NAME_CACHE_FILE);

        let cache = NameCache::load(path.clone());
        assert_eq!(cache.get("Neon Dawn"), None);
        cache.insert("Neon Dawn", "sp42").unwrap();
        assert_eq!(cache.get("Neon Dawn"), Some("sp42".to_string()));

        // A fresh instance reads the persisted file.
        let reloaded = NameCache::load(path);
        assert_eq!(reloaded.get("Neon Dawn"), Some("sp42".to_string()));
    }

    #[test]
    fn test_name_cache_tolerates_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(NAME_CACHE_FILE);
        std::fs::write(&path, "not json").unwrap();

        let cache = NameCache::load(path);
        assert_eq!(cache.get("anything"), None);
    }

    #[test]
    fn test_default_config_is_strict() {
        let config = ResolverConfig::default();
        assert_eq!(config.search_limit, 1);
        assert_eq!(config.market, "US");
    }
}
