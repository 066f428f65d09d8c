//! Mock Spotify/catalog HTTP server for the e2e suites.
//!
//! Runs a real axum server on an ephemeral port and a dedicated runtime
//! thread, so the blocking production clients can be driven against it from
//! plain test functions. Counters record how often each endpoint was hit and
//! small knobs inject 429/500 responses.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One artist known to the mock provider. Each entry in `release_labels`
/// becomes one album carrying that label.
#[derive(Clone)]
pub struct MockArtist {
    pub id: String,
    pub name: String,
    pub release_labels: Vec<String>,
    pub followers: i64,
    pub popularity: i64,
}

/// One artist listed by the mock catalog roster API.
#[derive(Clone)]
pub struct MockRosterArtist {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Default)]
pub struct MockProviderState {
    pub artists: Mutex<Vec<MockArtist>>,
    pub roster: Mutex<Vec<MockRosterArtist>>,
    /// IDs the bulk endpoint answers with null.
    pub unknown_ids: Mutex<Vec<String>>,

    pub token_exchanges: AtomicUsize,
    pub search_requests: AtomicUsize,
    pub bulk_requests: AtomicUsize,
    pub releases_requests: AtomicUsize,
    pub album_requests: AtomicUsize,

    /// Upcoming bulk requests to answer with 429.
    pub rate_limit_next: AtomicUsize,
    /// Retry-After seconds sent with injected 429s.
    pub rate_limit_retry_after: AtomicUsize,
    /// Upcoming bulk requests to answer with 500.
    pub fail_next_bulk: AtomicUsize,
}

pub struct MockProvider {
    pub state: Arc<MockProviderState>,
    pub base_url: String,
}

impl MockProvider {
    pub fn add_artist(&self, artist: MockArtist) {
        self.state.artists.lock().unwrap().push(artist);
    }

    pub fn add_roster_artist(&self, id: &str, name: &str, uri: &str) {
        self.state.roster.lock().unwrap().push(MockRosterArtist {
            id: id.to_string(),
            name: name.to_string(),
            uri: uri.to_string(),
        });
    }

    pub fn add_unknown_id(&self, id: &str) {
        self.state.unknown_ids.lock().unwrap().push(id.to_string());
    }

    pub fn inject_rate_limits(&self, count: usize, retry_after_secs: usize) {
        self.state.rate_limit_next.store(count, Ordering::SeqCst);
        self.state
            .rate_limit_retry_after
            .store(retry_after_secs, Ordering::SeqCst);
    }

    pub fn inject_bulk_failures(&self, count: usize) {
        self.state.fail_next_bulk.store(count, Ordering::SeqCst);
    }

    pub fn token_exchanges(&self) -> usize {
        self.state.token_exchanges.load(Ordering::SeqCst)
    }

    pub fn search_requests(&self) -> usize {
        self.state.search_requests.load(Ordering::SeqCst)
    }

    pub fn bulk_requests(&self) -> usize {
        self.state.bulk_requests.load(Ordering::SeqCst)
    }

    pub fn releases_requests(&self) -> usize {
        self.state.releases_requests.load(Ordering::SeqCst)
    }
}

/// Start the mock server; it lives until the test process exits.
pub fn start() -> MockProvider {
    let state = Arc::new(MockProviderState::default());
    state.rate_limit_retry_after.store(1, Ordering::SeqCst);

    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(search))
        .route("/v1/artists", get(bulk_artists))
        .route("/v1/artists/{id}/albums", get(artist_albums))
        .route("/v1/albums/{id}", get(album_detail))
        .route("/api/artists", get(roster))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    MockProvider {
        state,
        base_url: format!("http://{}", addr),
    }
}

async fn token(State(state): State<Arc<MockProviderState>>) -> Json<Value> {
    let exchange = state.token_exchanges.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": format!("test-token-{}", exchange),
        "expires_in": 3600,
    }))
}

async fn search(
    State(state): State<Arc<MockProviderState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.search_requests.fetch_add(1, Ordering::SeqCst);

    let query = params.get("q").cloned().unwrap_or_default();
    let name = query
        .strip_prefix("artist:\"")
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(&query)
        .to_lowercase();
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(1);

    let artists = state.artists.lock().unwrap();
    let items: Vec<Value> = artists
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&name))
        .take(limit)
        .map(|a| json!({ "id": a.id, "name": a.name }))
        .collect();

    Json(json!({ "artists": { "items": items } }))
}

async fn bulk_artists(
    State(state): State<Arc<MockProviderState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.bulk_requests.fetch_add(1, Ordering::SeqCst);

    if state.rate_limit_next.load(Ordering::SeqCst) > 0 {
        state.rate_limit_next.fetch_sub(1, Ordering::SeqCst);
        let retry_after = state.rate_limit_retry_after.load(Ordering::SeqCst);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("retry-after", retry_after.to_string())],
            "rate limited",
        )
            .into_response();
    }

    if state.fail_next_bulk.load(Ordering::SeqCst) > 0 {
        state.fail_next_bulk.fetch_sub(1, Ordering::SeqCst);
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let ids = params.get("ids").cloned().unwrap_or_default();
    let artists = state.artists.lock().unwrap();
    let unknown = state.unknown_ids.lock().unwrap();

    let entries: Vec<Value> = ids
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| {
            if unknown.iter().any(|u| u == id) {
                return Value::Null;
            }
            match artists.iter().find(|a| a.id == id) {
                Some(a) => json!({
                    "id": a.id,
                    "name": a.name,
                    "followers": { "total": a.followers },
                    "popularity": a.popularity,
                }),
                None => Value::Null,
            }
        })
        .collect();

    Json(json!({ "artists": entries })).into_response()
}

async fn artist_albums(
    State(state): State<Arc<MockProviderState>>,
    Path(artist_id): Path<String>,
) -> Json<Value> {
    state.releases_requests.fetch_add(1, Ordering::SeqCst);

    let artists = state.artists.lock().unwrap();
    let items: Vec<Value> = artists
        .iter()
        .find(|a| a.id == artist_id)
        .map(|a| {
            a.release_labels
                .iter()
                .enumerate()
                .map(|(i, _)| json!({ "id": format!("{}-album-{}", a.id, i) }))
                .collect()
        })
        .unwrap_or_default();

    Json(json!({ "items": items, "next": null }))
}

async fn album_detail(
    State(state): State<Arc<MockProviderState>>,
    Path(album_id): Path<String>,
) -> Response {
    state.album_requests.fetch_add(1, Ordering::SeqCst);

    // Album IDs are minted by artist_albums as "<artist>-album-<index>".
    let (artist_id, index) = match album_id.rsplit_once("-album-") {
        Some((artist_id, index_str)) => match index_str.parse::<usize>() {
            Ok(index) => (artist_id.to_string(), index),
            Err(_) => return (StatusCode::NOT_FOUND, "bad album id").into_response(),
        },
        None => return (StatusCode::NOT_FOUND, "unknown album").into_response(),
    };

    let artists = state.artists.lock().unwrap();
    let label = artists
        .iter()
        .find(|a| a.id == artist_id)
        .and_then(|a| a.release_labels.get(index))
        .cloned();

    match label {
        Some(label) => Json(json!({ "label": label })).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown album").into_response(),
    }
}

async fn roster(
    State(state): State<Arc<MockProviderState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(100);
    let offset: usize = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);

    let roster = state.roster.lock().unwrap();
    let data: Vec<Value> = roster
        .iter()
        .skip(offset)
        .take(limit)
        .map(|a| json!({ "Id": a.id, "Name": a.name, "URI": a.uri }))
        .collect();

    Json(json!({ "Artists": { "Total": roster.len(), "Data": data } }))
}
