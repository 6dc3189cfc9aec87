//! Cover image lookup
//!
//! A cover lookup maps an ISBN to an optional thumbnail URL. The catalog
//! talks to the Google Books volumes API by default; lookups can be switched
//! off entirely for offline use.

pub mod google_books;

pub use google_books::GoogleBooksClient;

use crate::core::config::CoverLookupConfig;
use crate::core::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a lookup that reached the service and got a usable answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverLookupOutcome {
    /// At least one volume matched; it may or may not have a thumbnail
    Found { thumbnail_url: Option<String> },
    /// The service knows no volume for this ISBN
    NotFound,
}

impl CoverLookupOutcome {
    /// The value shown to readers: the thumbnail URL or an empty string
    pub fn into_cover_image(self) -> String {
        match self {
            CoverLookupOutcome::Found { thumbnail_url } => thumbnail_url.unwrap_or_default(),
            CoverLookupOutcome::NotFound => String::new(),
        }
    }
}

/// Remote lookup of cover images by ISBN
///
/// Transport failures, non-success statuses and malformed bodies are all
/// reported as `Err`.
#[async_trait]
pub trait CoverLookup: Send + Sync {
    async fn lookup_by_isbn(&self, isbn: &str) -> Result<CoverLookupOutcome>;
}

/// Lookup used when covers are disabled; never leaves the process
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCoverLookup;

#[async_trait]
impl CoverLookup for DisabledCoverLookup {
    async fn lookup_by_isbn(&self, _isbn: &str) -> Result<CoverLookupOutcome> {
        Ok(CoverLookupOutcome::NotFound)
    }
}

/// Build the lookup described by the configuration
pub fn from_config(config: &CoverLookupConfig) -> Result<Arc<dyn CoverLookup>> {
    if !config.enabled {
        tracing::info!("Cover lookups disabled");
        return Ok(Arc::new(DisabledCoverLookup));
    }

    let client = GoogleBooksClient::new(&config.base_url, config.timeout())?;
    Ok(Arc::new(client))
}
