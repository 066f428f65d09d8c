//! Spotify Web API integration.
//!
//! This module provides the pieces every outbound Spotify call goes through:
//! - `token`: client-credentials bearer token with single-flight refresh
//! - `throttle`: process-wide token-bucket request pacing
//! - `response_cache`: never-expiring on-disk cache for resolution lookups
//! - `client`: rate-limited HTTP client tying the above together

pub mod client;
pub mod models;
pub mod response_cache;
pub mod throttle;
pub mod token;

pub use client::SpotifyClient;
pub use response_cache::ResponseCache;
pub use throttle::{NoOpThrottler, RequestThrottler, TokenBucket};
pub use token::TokenCache;

use thiserror::Error;

/// Errors surfaced by the Spotify client stack.
///
/// `Auth` is fatal to a whole run; the other variants abort only the unit of
/// work (one search, one batch) that triggered them. 429 responses are not
/// represented here: they are retried transparently and only show up as
/// `RetryExhausted` once the bounded retry budget is spent.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("credential exchange failed: {0}")]
    Auth(String),

    #[error("spotify returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited, gave up after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response cache error: {0}")]
    Cache(#[from] std::io::Error),
}
