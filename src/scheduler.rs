//! Batched image resolution pipeline
//!
//! Drives resolution for an ordered list of recommendations: fixed-size
//! concurrent batches, inter-batch pacing to respect the catalog's rate
//! limits, and incremental emission over a tokio channel so the caller can
//! render cards as they land instead of blocking on the slowest title.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cache::ImageCache;
use crate::data::{RecommendationRecord, ResolvedCard};
use crate::resolver::ImageResolver;

/// Number of resolutions in flight at once
pub const BATCH_SIZE: usize = 3;

/// Pause between batches, independent of how long a batch took
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(250);

/// Messages emitted by the pipeline as it makes progress
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A title resolved; completions within a batch arrive in any order
    CardReady(ResolvedCard),
    /// The first batch fully settled (however many of it succeeded).
    /// Emitted exactly once; the caller's cue to stop showing a global
    /// loading state.
    FirstBatchDone,
}

/// Handle for consuming and cancelling a running pipeline
///
/// The channel closes once every batch has settled; accumulating the
/// emitted cards is the caller's job.
pub struct PipelineHandle {
    receiver: mpsc::Receiver<PipelineEvent>,
    cancel: CancellationToken,
}

impl PipelineHandle {
    /// Receives the next pipeline event; `None` once the pipeline is done
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        self.receiver.recv().await
    }

    /// Requests cooperative cancellation.
    ///
    /// The pipeline stops before launching the next batch and abandons any
    /// batch still in flight; no further events are emitted.
    #[allow(dead_code)]
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a clone of the pipeline's cancellation token, for callers
    /// that cancel from a different task than the one consuming events
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Schedules batched, rate-limited resolution over an ordered record list
pub struct BatchScheduler {
    resolver: ImageResolver,
    cache: Arc<Mutex<ImageCache>>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchScheduler {
    /// Creates a scheduler with the default batch size and pacing delay
    pub fn new(resolver: ImageResolver, cache: Arc<Mutex<ImageCache>>) -> Self {
        Self {
            resolver,
            cache,
            batch_size: BATCH_SIZE,
            batch_delay: RATE_LIMIT_DELAY,
        }
    }

    /// Overrides the batch size
    #[allow(dead_code)]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Overrides the inter-batch pacing delay
    #[allow(dead_code)]
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Spawns the pipeline over the given records and returns its handle.
    ///
    /// Records are partitioned into contiguous batches in input order; batch
    /// k+1 never starts before batch k fully settles. A record whose
    /// resolution fails is logged and dropped; it produces no card and
    /// never aborts the batch.
    pub fn spawn(self, records: Vec<RecommendationRecord>) -> PipelineHandle {
        let (tx, rx) = mpsc::channel(32);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            self.run(records, tx, token).await;
        });

        PipelineHandle {
            receiver: rx,
            cancel,
        }
    }

    async fn run(
        self,
        records: Vec<RecommendationRecord>,
        tx: mpsc::Sender<PipelineEvent>,
        cancel: CancellationToken,
    ) {
        let batches: Vec<&[RecommendationRecord]> = records.chunks(self.batch_size).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("pipeline cancelled before batch {}", index + 1);
                return;
            }

            let settles = batch.iter().map(|record| {
                let resolver = &self.resolver;
                let tx = tx.clone();
                async move {
                    match resolver.resolve(&record.name).await {
                        Ok(image_url) => {
                            let card = ResolvedCard {
                                record: record.clone(),
                                image_url,
                            };
                            // Receiver gone means the caller stopped
                            // listening; nothing left to do for this card.
                            let _ = tx.send(PipelineEvent::CardReady(card)).await;
                        }
                        Err(err) => {
                            log::warn!("dropping \"{}\": {}", record.name, err);
                        }
                    }
                }
            });

            tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("pipeline cancelled during batch {}", index + 1);
                    return;
                }
                _ = futures::future::join_all(settles) => {}
            }

            if index == 0 {
                let _ = tx.send(PipelineEvent::FirstBatchDone).await;
            }

            {
                let cache = self.cache.lock().expect("image cache lock poisoned");
                if !cache.is_empty() {
                    cache.flush();
                }
            }

            if index + 1 < batch_count {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::info!("pipeline cancelled between batches");
                        return;
                    }
                    _ = tokio::time::sleep(self.batch_delay) => {}
                }
            }
        }
    }
}
