//! Async task: reads provider callbacks from an mpsc channel and handles each one on its
//! own task.
//!
//! Bounded by a semaphore; the channel itself is bounded too, so a burst of callbacks makes
//! the provider shim wait instead of growing memory.

use crate::ports::ProviderPayload;
use crate::usecases::transition_ingestion::{IngestOutcome, TransitionIngestion};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Totals for one worker run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: usize,
    pub dispatched: usize,
    /// Tasks that panicked instead of returning an outcome.
    pub crashed: usize,
}

impl WorkerStats {
    fn record(&mut self, joined: Result<IngestOutcome, tokio::task::JoinError>) {
        match joined {
            Ok(outcome) => {
                self.handled += 1;
                if matches!(outcome, IngestOutcome::Dispatched { .. }) {
                    self.dispatched += 1;
                }
            }
            Err(e) => {
                error!(error = %e, "ingestion task crashed");
                self.crashed += 1;
            }
        }
    }
}

pub struct IngestionWorker {
    ingestion: Arc<TransitionIngestion>,
    rx: mpsc::Receiver<ProviderPayload>,
    concurrency: usize,
}

impl IngestionWorker {
    pub fn new(
        ingestion: Arc<TransitionIngestion>,
        rx: mpsc::Receiver<ProviderPayload>,
        concurrency: usize,
    ) -> Self {
        Self {
            ingestion,
            rx,
            concurrency: concurrency.max(1),
        }
    }

    /// Run until the channel is closed and every started callback has finished.
    pub async fn run(mut self) -> WorkerStats {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut stats = WorkerStats::default();

        while let Some(payload) = self.rx.recv().await {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let ingestion = Arc::clone(&self.ingestion);
            tasks.spawn(async move {
                let _permit = permit;
                ingestion.handle(payload).await
            });

            while let Some(joined) = tasks.try_join_next() {
                stats.record(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            stats.record(joined);
        }

        info!(
            handled = stats.handled,
            dispatched = stats.dispatched,
            crashed = stats.crashed,
            "ingestion worker finished (channel closed)"
        );
        stats
    }
}
