//! Per-title image resolution
//!
//! Resolves one recommendation title to a verified poster image URL:
//! consults the persistent cache, then walks the title's search variations
//! against the media catalog with a bounded retry budget and fixed backoff.
//! The resolver knows nothing about batching or concurrency limits; that
//! discipline belongs to the scheduler driving it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;

use crate::cache::ImageCache;
use crate::data::catalog::{CatalogError, MediaCatalog};
use crate::matching::select_best;
use crate::normalize::search_variations;

/// Attempts per search variation before falling through to the next one
pub const MAX_ATTEMPTS_PER_VARIATION: u32 = 3;

/// Fixed pause between retry attempts and after a rate-limit response
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Errors surfaced by [`ImageResolver::resolve`]
///
/// Transient catalog failures are retried internally; exhaustion of every
/// variation is the only terminal outcome, and it is terminal for the one
/// title only.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every variation and attempt was exhausted without a verified image
    #[error("no matching image found for \"{0}\"")]
    NotFound(String),
}

/// Resolves a single title to a verified image URL
#[derive(Clone)]
pub struct ImageResolver {
    catalog: Arc<dyn MediaCatalog>,
    cache: Arc<Mutex<ImageCache>>,
    max_attempts: u32,
}

impl ImageResolver {
    /// Creates a resolver over the given catalog and shared cache
    pub fn new(catalog: Arc<dyn MediaCatalog>, cache: Arc<Mutex<ImageCache>>) -> Self {
        Self {
            catalog,
            cache,
            max_attempts: MAX_ATTEMPTS_PER_VARIATION,
        }
    }

    /// Overrides the per-variation attempt budget
    #[allow(dead_code)]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Resolves a title to an image URL, merging the result into the cache.
    ///
    /// Tries each search variation in priority order, up to
    /// [`MAX_ATTEMPTS_PER_VARIATION`] attempts each. A rate-limit response
    /// sleeps [`RETRY_BACKOFF`] and consumes the attempt; other transient
    /// failures sleep only when attempts remain for the variation. A search
    /// that succeeds but yields no usable match consumes its attempt without
    /// backoff.
    pub async fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        let cached = {
            let cache = self.cache.lock().expect("image cache lock poisoned");
            cache.lookup(name).map(str::to_owned)
        };
        if let Some(image_url) = cached {
            log::debug!("cache hit for \"{}\"", name);
            return Ok(image_url);
        }

        for variation in search_variations(name) {
            for attempt in 1..=self.max_attempts {
                match self.try_variation(&variation).await {
                    Ok(Some(image_url)) => {
                        let mut cache = self.cache.lock().expect("image cache lock poisoned");
                        cache.merge(name, image_url.as_str());
                        return Ok(image_url);
                    }
                    Ok(None) => {
                        log::debug!("no match for \"{}\" (attempt {})", variation, attempt);
                    }
                    Err(CatalogError::RateLimited) => {
                        log::debug!("rate limited searching \"{}\", backing off", variation);
                        sleep(RETRY_BACKOFF).await;
                    }
                    Err(err) => {
                        log::warn!("attempt {} failed for \"{}\": {}", attempt, variation, err);
                        if attempt < self.max_attempts {
                            sleep(RETRY_BACKOFF).await;
                        }
                    }
                }
            }
        }

        Err(ResolveError::NotFound(name.to_string()))
    }

    /// Runs one search attempt for a variation.
    ///
    /// `Ok(None)` means the search worked but produced no candidate with a
    /// verifiable image; an `Err` is a transient failure charged against the
    /// attempt budget.
    async fn try_variation(&self, variation: &str) -> Result<Option<String>, CatalogError> {
        let candidates = self.catalog.search(variation).await?;

        let Some(hit) = select_best(variation, &candidates) else {
            return Ok(None);
        };
        let Some(image_url) = hit.image_url() else {
            return Ok(None);
        };

        self.catalog.verify_image(image_url).await?;
        Ok(Some(image_url.to_string()))
    }
}
