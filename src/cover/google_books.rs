//! Google Books volumes API client

use super::{CoverLookup, CoverLookupOutcome};
use crate::core::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Client for `GET {base_url}?q=isbn:{isbn}`
#[derive(Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
}

impl GoogleBooksClient {
    /// Create a client; `timeout` bounds each lookup end to end
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("library-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    #[serde(rename = "imageLinks", default)]
    image_links: ImageLinks,
}

#[derive(Debug, Default, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

impl From<VolumesResponse> for CoverLookupOutcome {
    fn from(response: VolumesResponse) -> Self {
        match response.items.into_iter().next() {
            Some(volume) => CoverLookupOutcome::Found {
                thumbnail_url: volume.volume_info.image_links.thumbnail,
            },
            None => CoverLookupOutcome::NotFound,
        }
    }
}

#[async_trait]
impl CoverLookup for GoogleBooksClient {
    async fn lookup_by_isbn(&self, isbn: &str) -> Result<CoverLookupOutcome> {
        let query = format!("isbn:{}", isbn);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout(format!("Cover lookup for {} timed out", isbn))
                } else {
                    CatalogError::NetworkError(format!("Cover lookup for {} failed: {}", isbn, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::NetworkError(format!(
                "Cover lookup for {} returned {}",
                isbn, status
            )));
        }

        let body: VolumesResponse = response.json().await.map_err(|e| {
            CatalogError::DeserializationError(format!("Malformed cover lookup response: {}", e))
        })?;

        Ok(body.into())
    }
}
