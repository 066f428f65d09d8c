//! Rate-limited HTTP client for the Spotify Web API.
//!
//! Every request draws from the shared throttler and carries a bearer token
//! from the `TokenCache`. 429 responses are retried transparently, honoring
//! `Retry-After`, up to a bounded number of attempts; any other non-2xx
//! status fails the request immediately.

use super::response_cache::ResponseCache;
use super::throttle::RequestThrottler;
use super::token::TokenCache;
use super::ProviderError;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts per request before a persistent 429 becomes `RetryExhausted`.
const MAX_RATE_LIMIT_ATTEMPTS: u32 = 5;

/// Sleep applied when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SpotifyClient {
    client: Client,
    api_base: String,
    tokens: Arc<TokenCache>,
    throttler: Arc<dyn RequestThrottler>,
    cache: ResponseCache,
}

impl SpotifyClient {
    pub fn new(
        api_base: String,
        tokens: Arc<TokenCache>,
        throttler: Arc<dyn RequestThrottler>,
        cache: ResponseCache,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_base,
            tokens,
            throttler,
            cache,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// GET a JSON endpoint. Never consults the response cache; use this for
    /// time-varying data such as metric snapshots.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let bytes = self.get_raw(path, params)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a JSON endpoint through the on-disk response cache. Repeated calls
    /// with identical parameters return the stored payload without touching
    /// the network; entries never expire (see `ResponseCache`).
    pub fn get_json_cached<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let key = ResponseCache::request_key(path, params);
        if let Some(bytes) = self.cache.get(&key)? {
            debug!("Response cache hit for {}", path);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let bytes = self.get_raw(path, params)?;
        self.cache.put(&key, &bytes)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Issue the request with throttling, bearer auth and bounded 429 retry.
    ///
    /// `path` may be a path under the API base or a full URL (pagination
    /// `next` links come back absolute).
    fn get_raw(&self, path: &str, params: &[(String, String)]) -> Result<Vec<u8>, ProviderError> {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.api_base, path)
        };

        for attempt in 1..=MAX_RATE_LIMIT_ATTEMPTS {
            self.throttler.acquire();
            let token = self.tokens.get_token()?;

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(params)
                .send()?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warn!(
                    "Rate limited on {} (attempt {}/{}), sleeping {}s",
                    path, attempt, MAX_RATE_LIMIT_ATTEMPTS, retry_after
                );
                std::thread::sleep(Duration::from_secs(retry_after));
                continue;
            }

            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(ProviderError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.bytes()?.to_vec());
        }

        Err(ProviderError::RetryExhausted {
            attempts: MAX_RATE_LIMIT_ATTEMPTS,
        })
    }
}
