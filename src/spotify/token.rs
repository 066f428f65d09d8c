//! Bearer token management for the Spotify client-credentials flow.

use super::ProviderError;
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Safety margin subtracted from the provider's expiry so an in-flight
/// request never rides a token that lapses mid-call.
const EXPIRY_SKEW_SECS: i64 = 60;

const TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// Epoch seconds past which the token is no longer handed out.
    expires_at: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Process-wide cache for the Spotify bearer token.
///
/// The slot is guarded by a mutex held across the credential exchange, so
/// concurrent callers during a refresh wait for, and share, the same token
/// instead of racing duplicate exchanges. The slot is replaced on refresh,
/// never mutated in place.
pub struct TokenCache {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        token_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(TOKEN_EXCHANGE_TIMEOUT).build()?;

        Ok(Self {
            client,
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, exchanging credentials if the cached one
    /// is missing or inside the expiry skew window.
    pub fn get_token(&self) -> Result<String, ProviderError> {
        let mut slot = self.token.lock().unwrap();
        if let Some(cached) = slot.as_ref() {
            if Utc::now().timestamp() < cached.expires_at {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.exchange()?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    fn exchange(&self) -> Result<CachedToken, ProviderError> {
        debug!("Exchanging client credentials for a new token");
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| ProviderError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .map_err(|e| ProviderError::Auth(format!("invalid token response: {}", e)))?;

        Ok(CachedToken {
            value: body.access_token,
            expires_at: Utc::now().timestamp() + body.expires_in - EXPIRY_SKEW_SECS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_defaults_expires_in() {
        let body: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(body.expires_in, 3600);
        assert_eq!(body.access_token, "abc");
    }

    #[test]
    fn test_exchange_failure_is_auth_error() {
        // Nothing listens on this port, so the exchange fails at transport level.
        let cache = TokenCache::new("http://127.0.0.1:9/token", "id", "secret").unwrap();
        let result = cache.get_token();
        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }
}
