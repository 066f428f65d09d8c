//! Shared helpers for the e2e suites.

// Not every suite uses every helper.
#![allow(dead_code)]

pub mod provider_server;

use labelpulse::metrics_store::{MetricsStore, SqliteMetricsStore};
use labelpulse::resolver::{CatalogMembershipResolver, ManualOverrides, ResolverConfig};
use labelpulse::roster_store::{RosterStore, SqliteRosterStore};
use labelpulse::spotify::{NoOpThrottler, ResponseCache, SpotifyClient, TokenCache};
use provider_server::{MockArtist, MockProvider};
use std::path::Path;
use std::sync::Arc;

pub const TEST_LABEL: &str = "Monstercat";

/// Build a real Spotify client stack pointed at the mock server.
pub fn spotify_client(mock: &MockProvider, cache_dir: &Path) -> Arc<SpotifyClient> {
    let tokens = Arc::new(
        TokenCache::new(
            &format!("{}/api/token", mock.base_url),
            "test-client-id",
            "test-client-secret",
        )
        .unwrap(),
    );
    let cache = ResponseCache::new(cache_dir).unwrap();
    Arc::new(
        SpotifyClient::new(mock.base_url.clone(), tokens, Arc::new(NoOpThrottler), cache).unwrap(),
    )
}

pub fn make_resolver(
    mock: &MockProvider,
    cache_dir: &Path,
    overrides: ManualOverrides,
    search_limit: u32,
) -> CatalogMembershipResolver {
    CatalogMembershipResolver::new(
        spotify_client(mock, cache_dir),
        ResolverConfig {
            label_name: TEST_LABEL.to_string(),
            search_limit,
            market: "US".to_string(),
        },
        overrides,
        cache_dir,
    )
    .unwrap()
}

pub fn make_stores() -> (Arc<dyn RosterStore>, Arc<dyn MetricsStore>) {
    (
        Arc::new(SqliteRosterStore::open_in_memory().unwrap()),
        Arc::new(SqliteMetricsStore::open_in_memory().unwrap()),
    )
}

/// The canonical resolvable artist: an exact-name match with a label release.
pub fn label_artist(id: &str, name: &str) -> MockArtist {
    MockArtist {
        id: id.to_string(),
        name: name.to_string(),
        release_labels: vec![TEST_LABEL.to_string()],
        followers: 1000,
        popularity: 55,
    }
}
