//! Client for the label's public roster API, used to seed the artists table.

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Roster page size; the catalog API allows up to 400 per request.
const ROSTER_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct RosterResponse {
    #[serde(rename = "Artists")]
    artists: RosterEnvelope,
}

#[derive(Debug, Deserialize)]
struct RosterEnvelope {
    #[serde(rename = "Total")]
    total: usize,
    #[serde(rename = "Data", default)]
    data: Vec<CatalogArtist>,
}

/// One artist as listed by the catalog roster API.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogArtist {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "URI")]
    pub uri: Option<String>,
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_page(&self, limit: usize, offset: usize) -> Result<RosterResponse> {
        let url = format!("{}/api/artists", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)])
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Roster request failed with status: {}",
                response.status()
            ));
        }

        Ok(response.json()?)
    }

    /// Page through the full roster.
    ///
    /// A short page ends the walk even if the reported total claims more.
    pub fn fetch_all(&self) -> Result<Vec<CatalogArtist>> {
        let first = self.fetch_page(1, 0)?;
        let total = first.artists.total;
        debug!("Catalog roster reports {} artists", total);

        let mut artists = Vec::with_capacity(total);
        let mut offset = 0;
        while offset < total {
            let page = self.fetch_page(ROSTER_PAGE_SIZE, offset)?;
            if page.artists.data.is_empty() {
                break;
            }
            offset += page.artists.data.len();
            artists.extend(page.artists.data);
        }

        Ok(artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = CatalogClient::new("http://localhost:8080".to_string(), 30).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_roster_response_shape() {
        let body = r#"{"Artists":{"Total":2,"Data":[
            {"Id":"mc1","Name":"Neon Dawn","URI":"neon-dawn"},
            {"Id":"mc2","Name":"Glass Harbor","URI":null}
        ]}}"#;
        let response: RosterResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.artists.total, 2);
        assert_eq!(response.artists.data[0].id, "mc1");
        assert_eq!(response.artists.data[1].uri, None);
    }
}
