//! anirec - Anime recommendations with poster art in the terminal
//!
//! Queries a remote scoring service for recommendations, then resolves a
//! poster image per title from the Jikan catalog, printing cards as they
//! land rather than waiting for the slowest lookup.

mod cache;
mod cli;
mod data;
mod matching;
mod normalize;
mod resolver;
mod scheduler;

use std::sync::{Arc, Mutex};

use clap::Parser;

use cache::ImageCache;
use cli::{Cli, Command};
use data::{JikanClient, RecommendClient, RecommendationRecord, ResolvedCard};
use resolver::ImageResolver;
use scheduler::{BatchScheduler, PipelineEvent};

/// Prints one resolved card as it arrives
fn print_card(card: &ResolvedCard) {
    let rating = card
        .record
        .rating
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "N/A".to_string());
    let genres = card.record.genre_tags().join(", ");

    if genres.is_empty() {
        println!("  * {} [{}]\n      {}", card.record.name, rating, card.image_url);
    } else {
        println!(
            "  * {} [{}] ({})\n      {}",
            card.record.name, rating, genres, card.image_url
        );
    }
}

/// Prints the final summary in the original recommendation order.
///
/// Emission order within a batch is unspecified, so the materialized list
/// is re-derived by matching cards back against the ordered records.
fn print_summary(records: &[RecommendationRecord], cards: &[ResolvedCard]) {
    println!();
    println!("Resolved {} of {} posters", cards.len(), records.len());
    for (index, record) in records.iter().enumerate() {
        match cards.iter().find(|card| card.record.name == record.name) {
            Some(card) => println!("{:>3}. {} - {}", index + 1, record.name, card.image_url),
            None => println!("{:>3}. {} - no image found", index + 1, record.name),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut clog = colog::default_builder();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    clog.filter(None, level);
    clog.init();

    args.validate()?;

    let recommend = RecommendClient::new(&args.api_url);
    let records = match &args.command {
        Command::Similar {
            name,
            top_n,
            min_rating,
        } => {
            println!("Finding anime similar to \"{}\"...", name);
            recommend.similar(name, *top_n, *min_rating).await?
        }
        Command::Genre {
            genres,
            kind,
            top_n,
        } => {
            println!("Finding anime for genres: {}...", genres.join(", "));
            recommend
                .by_genre(genres, kind.as_deref(), *top_n)
                .await?
                .into_ordered()
        }
    };

    println!("Got {} recommendations, resolving poster art...\n", records.len());

    // Fall back to a temp-dir snapshot when no home directory is available
    let mut cache = ImageCache::new().unwrap_or_else(|| {
        ImageCache::with_path(std::env::temp_dir().join("anirec").join("image_cache.json"))
    });
    let restored = cache.load();
    if restored > 0 {
        log::info!("restored {} cached image URLs", restored);
    }
    let cache = Arc::new(Mutex::new(cache));

    let resolver = ImageResolver::new(Arc::new(JikanClient::new()), cache.clone());
    let mut pipeline = BatchScheduler::new(resolver, cache).spawn(records.clone());

    // Ctrl-C cancels cooperatively; the event loop below then drains and exits
    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupted, cancelling pipeline");
            cancel.cancel();
        }
    });

    let mut cards: Vec<ResolvedCard> = Vec::new();
    while let Some(event) = pipeline.recv().await {
        match event {
            PipelineEvent::CardReady(card) => {
                print_card(&card);
                cards.push(card);
            }
            PipelineEvent::FirstBatchDone => {
                log::info!("first batch ready");
            }
        }
    }

    print_summary(&records, &cards);

    Ok(())
}
