//! Jikan media catalog client
//!
//! This module provides search against the Jikan anime catalog and
//! verification that a candidate poster image actually decodes. The catalog
//! is consumed through the [`MediaCatalog`] trait so the resolver and
//! scheduler can be exercised against scripted stubs in tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Base URL for the Jikan v4 API
const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Maximum number of candidates requested per search
pub const SEARCH_RESULT_LIMIT: u8 = 5;

/// Errors that can occur when talking to the media catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog rejected the request with HTTP 429
    #[error("catalog rate limit hit")]
    RateLimited,

    /// The catalog returned a non-success status other than 429
    #[error("catalog request failed with status {0}")]
    Status(StatusCode),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Fetched image bytes could not be decoded
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),
}

/// Response envelope from the Jikan search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Missing `data` is treated as an empty result set
    #[serde(default)]
    data: Vec<SearchHit>,
}

/// A single candidate returned by a catalog search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Primary title
    pub title: String,
    /// Alternate titles (romaji, English, synonyms)
    #[serde(default)]
    pub titles: Vec<AltTitle>,
    /// Image URLs by format
    #[serde(default)]
    pub images: Option<HitImages>,
}

/// An alternate title entry for a search hit
#[derive(Debug, Clone, Deserialize)]
pub struct AltTitle {
    pub title: String,
}

/// Image section of a search hit
#[derive(Debug, Clone, Deserialize)]
pub struct HitImages {
    #[serde(default)]
    pub jpg: Option<JpgImage>,
}

/// JPEG variant of a hit's images
#[derive(Debug, Clone, Deserialize)]
pub struct JpgImage {
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SearchHit {
    /// Returns the hit's display image URL, if it exposes one
    pub fn image_url(&self) -> Option<&str> {
        self.images.as_ref()?.jpg.as_ref()?.image_url.as_deref()
    }
}

/// The seam between the image pipeline and the external catalog.
///
/// Implemented by [`JikanClient`] in production and by scripted stubs in
/// tests.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Searches the catalog for a title, returning up to
    /// [`SEARCH_RESULT_LIMIT`] candidates in provider order.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError>;

    /// Fetches and decodes an image URL, confirming it is actually loadable.
    async fn verify_image(&self, url: &str) -> Result<(), CatalogError>;
}

/// Client for the Jikan anime catalog
#[derive(Debug, Clone)]
pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JikanClient {
    /// Creates a new JikanClient against the public Jikan v4 API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: JIKAN_BASE_URL.to_string(),
        }
    }

    /// Creates a new JikanClient with a custom base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MediaCatalog for JikanClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError> {
        let url = format!("{}/anime", self.base_url);
        let limit = SEARCH_RESULT_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: SearchResponse = response.json().await?;
                Ok(body.data)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited),
            status => Err(CatalogError::Status(status)),
        }
    }

    async fn verify_image(&self, url: &str) -> Result<(), CatalogError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let bytes = response.bytes().await?;
        image::load_from_memory(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_hits(json: &str) -> Vec<SearchHit> {
        serde_json::from_str::<SearchResponse>(json)
            .expect("Should parse search response")
            .data
    }

    #[test]
    fn test_search_response_parses_full_hit() {
        let hits = parse_hits(
            r#"{
                "data": [{
                    "title": "Naruto",
                    "titles": [{"title": "NARUTO"}, {"title": "Naruto (2002)"}],
                    "images": {"jpg": {"image_url": "https://cdn.example/naruto.jpg"}}
                }]
            }"#,
        );

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Naruto");
        assert_eq!(hits[0].titles.len(), 2);
        assert_eq!(hits[0].image_url(), Some("https://cdn.example/naruto.jpg"));
    }

    #[test]
    fn test_search_response_tolerates_missing_optional_fields() {
        let hits = parse_hits(r#"{"data": [{"title": "Bleach"}]}"#);

        assert_eq!(hits.len(), 1);
        assert!(hits[0].titles.is_empty());
        assert!(hits[0].image_url().is_none());
    }

    #[test]
    fn test_search_response_missing_data_is_empty() {
        let hits = parse_hits(r#"{}"#);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_image_url_requires_every_level() {
        let hits = parse_hits(
            r#"{"data": [{"title": "A", "images": {"jpg": {}}}, {"title": "B", "images": {}}]}"#,
        );

        assert!(hits[0].image_url().is_none());
        assert!(hits[1].image_url().is_none());
    }
}
