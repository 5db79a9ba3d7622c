//! Recommendation scoring service client
//!
//! Fetches ranked recommendation lists from the remote scoring service. The
//! scoring algorithm itself is opaque; this client only shapes requests and
//! tolerates the service's loose response formats.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RecommendationRecord;

/// Base URL for the deployed recommendation model API
pub const RECOMMEND_BASE_URL: &str = "https://animerecmodelapi.onrender.com";

/// Errors that can occur when fetching recommendations
#[derive(Debug, Error)]
pub enum RecommendError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service returned a non-success status
    #[error("recommendation service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The service answered with an explanatory message and no results
    #[error("{0}")]
    ServiceMessage(String),
}

/// Response from the similar-anime endpoint
#[derive(Debug, Deserialize)]
struct SimilarResponse {
    #[serde(default)]
    recommendations: Vec<RecommendationRecord>,
    #[serde(default)]
    message: Option<String>,
}

/// Request body for the genre endpoint
#[derive(Debug, Serialize)]
struct GenreRequest<'a> {
    genres: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    type_anime: Option<&'a str>,
    top_n: u32,
}

/// The genre endpoint answers either with a bare array or with two ranked
/// lists; both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenreResponse {
    Flat(Vec<RecommendationRecord>),
    Split {
        #[serde(default)]
        popular: Vec<RecommendationRecord>,
        #[serde(default)]
        relevant: Vec<RecommendationRecord>,
    },
}

/// Genre recommendations, split the way the service ranks them
#[derive(Debug, Default)]
pub struct GenreRecommendations {
    /// Broadly popular titles for the genres
    pub popular: Vec<RecommendationRecord>,
    /// Titles most relevant to the exact genre combination
    pub relevant: Vec<RecommendationRecord>,
}

impl GenreRecommendations {
    /// Concatenates both lists in display order (popular first)
    pub fn into_ordered(self) -> Vec<RecommendationRecord> {
        let mut all = self.popular;
        all.extend(self.relevant);
        all
    }

    /// Whether neither list holds any record
    pub fn is_empty(&self) -> bool {
        self.popular.is_empty() && self.relevant.is_empty()
    }
}

/// Client for the recommendation scoring service
#[derive(Debug, Clone)]
pub struct RecommendClient {
    client: Client,
    base_url: String,
}

impl RecommendClient {
    /// Creates a client against the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches titles similar to a given anime.
    ///
    /// # Arguments
    /// * `anime_name` - Title to find similar anime for
    /// * `top_n` - Number of recommendations requested
    /// * `rating_threshold` - Minimum predicted rating to include
    ///
    /// # Returns
    /// * `Ok(Vec<RecommendationRecord>)` - Non-empty ranked list
    /// * `Err(RecommendError)` - Request failure, or the service's own
    ///   explanation when it has no recommendations to offer
    pub async fn similar(
        &self,
        anime_name: &str,
        top_n: u32,
        rating_threshold: f64,
    ) -> Result<Vec<RecommendationRecord>, RecommendError> {
        let url = format!("{}/recommend_similar_anime/", self.base_url);
        let top_n = top_n.to_string();
        let rating_threshold = rating_threshold.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("anime_name", anime_name),
                ("top_n", top_n.as_str()),
                ("rating_threshold", rating_threshold.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Status { status, body });
        }

        let body: SimilarResponse = response.json().await?;
        if !body.recommendations.is_empty() {
            return Ok(body.recommendations);
        }
        Err(RecommendError::ServiceMessage(body.message.unwrap_or_else(
            || "No recommendations found for this anime".to_string(),
        )))
    }

    /// Fetches recommendations for a set of genres.
    ///
    /// # Arguments
    /// * `genres` - Genre tags to recommend for
    /// * `type_anime` - Optional media type filter (e.g. "TV")
    /// * `top_n` - Number of recommendations requested per list
    pub async fn by_genre(
        &self,
        genres: &[String],
        type_anime: Option<&str>,
        top_n: u32,
    ) -> Result<GenreRecommendations, RecommendError> {
        let url = format!("{}/recommend/genre", self.base_url);
        let request = GenreRequest {
            genres,
            type_anime,
            top_n,
        };

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Status { status, body });
        }

        let recommendations = match response.json::<GenreResponse>().await? {
            GenreResponse::Flat(relevant) => GenreRecommendations {
                popular: Vec::new(),
                relevant,
            },
            GenreResponse::Split { popular, relevant } => {
                GenreRecommendations { popular, relevant }
            }
        };

        if recommendations.is_empty() {
            return Err(RecommendError::ServiceMessage(
                "No recommendations found for these genres".to_string(),
            ));
        }
        Ok(recommendations)
    }
}
