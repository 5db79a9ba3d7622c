//! Command-line interface parsing for the anime recommendation CLI
//!
//! This module handles parsing of CLI arguments using clap, with one
//! subcommand per recommendation mode (similar-title and by-genre) and
//! range validation for the numeric knobs the scoring service accepts.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::recommend::RECOMMEND_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// top-n outside the range the service accepts
    #[error("top-n must be between 1 and 100 (got {0})")]
    TopNOutOfRange(u32),

    /// rating threshold outside the 0-10 scale
    #[error("min-rating must be between 0 and 10 (got {0})")]
    RatingOutOfRange(f64),
}

/// Anime recommendations with poster art, in your terminal
#[derive(Parser, Debug)]
#[command(name = "anirec")]
#[command(about = "Fetch anime recommendations and resolve poster images")]
#[command(version)]
pub struct Cli {
    /// Base URL of the recommendation scoring service
    #[arg(long, value_name = "URL", default_value = RECOMMEND_BASE_URL)]
    pub api_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Recommendation modes
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find anime similar to a given title
    ///
    /// Examples:
    ///   anirec similar "Naruto"
    ///   anirec similar "Death Note" --top-n 10 --min-rating 7.5
    Similar {
        /// Title to find similar anime for
        name: String,

        /// Number of recommendations to request
        #[arg(long, default_value_t = 5)]
        top_n: u32,

        /// Minimum predicted rating to include (0-10)
        #[arg(long, default_value_t = 6.0)]
        min_rating: f64,
    },

    /// Recommend anime for one or more genres
    ///
    /// Examples:
    ///   anirec genre Action
    ///   anirec genre Action Comedy --kind TV --top-n 10
    Genre {
        /// Genre tags to recommend for
        #[arg(required = true)]
        genres: Vec<String>,

        /// Media type filter (e.g. TV, Movie)
        #[arg(long, value_name = "TYPE")]
        kind: Option<String>,

        /// Number of recommendations to request
        #[arg(long, default_value_t = 10)]
        top_n: u32,
    },
}

impl Cli {
    /// Validates numeric arguments against the ranges the service accepts.
    ///
    /// # Returns
    /// * `Ok(())` when every argument is in range
    /// * `Err(CliError)` naming the offending argument otherwise
    pub fn validate(&self) -> Result<(), CliError> {
        let (top_n, min_rating) = match &self.command {
            Command::Similar {
                top_n, min_rating, ..
            } => (*top_n, Some(*min_rating)),
            Command::Genre { top_n, .. } => (*top_n, None),
        };

        if top_n < 1 || top_n > 100 {
            return Err(CliError::TopNOutOfRange(top_n));
        }
        if let Some(rating) = min_rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(CliError::RatingOutOfRange(rating));
            }
        }
        Ok(())
    }
}
