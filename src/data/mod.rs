//! Core data models for the anime recommendation CLI
//!
//! This module contains the record types exchanged with the recommendation
//! service and the clients for both external collaborators: the scoring
//! service that produces ranked titles, and the media catalog the image
//! pipeline searches for poster art.

pub mod catalog;
pub mod recommend;

pub use catalog::{CatalogError, JikanClient, MediaCatalog, SearchHit};
pub use recommend::{GenreRecommendations, RecommendClient, RecommendError};

use serde::{Deserialize, Serialize};

/// One ranked title returned by the recommendation service
///
/// Only `name` is guaranteed; `genre` is a comma-joined tag list and
/// `rating` a 0–10 score, both optional. Records are immutable once
/// received and are identified by `name`, which is unique within a single
/// response but not globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Title of the recommended anime
    pub name: String,
    /// Comma-joined genre tags, if provided
    #[serde(default)]
    pub genre: Option<String>,
    /// Predicted rating on a 0–10 scale, if provided
    #[serde(default)]
    pub rating: Option<f64>,
}

impl RecommendationRecord {
    /// Splits the comma-joined genre field into trimmed tags
    pub fn genre_tags(&self) -> Vec<&str> {
        self.genre
            .as_deref()
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A recommendation paired with its resolved display image
///
/// The unit streamed back to the caller as the pipeline makes progress.
/// Created when a title's image resolves; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCard {
    /// The recommendation this card displays
    pub record: RecommendationRecord,
    /// Verified display image URL
    pub image_url: String,
}
