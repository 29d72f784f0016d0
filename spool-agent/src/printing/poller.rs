//! Queue poller
//!
//! Fetches at most one job per tick and drives it to completion before the
//! next fetch. Ticks that fall due while a job is still in flight are
//! skipped, so polls never overlap.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use spool_printer::DeviceSink;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::processor::{JobOutcome, JobProcessor};
use crate::queue::{JobReporter, JobSource};

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Queue had nothing for this printer
    NoJob,
    /// Fetch failed, retried on the next tick
    FetchFailed,
    /// A job was fetched and reached a terminal state
    Processed(JobOutcome),
}

pub struct Poller<Q, S, R> {
    source: Q,
    processor: JobProcessor<S, R>,
    interval: Duration,
}

impl<Q, S, R> Poller<Q, S, R>
where
    Q: JobSource,
    S: DeviceSink,
    R: JobReporter,
{
    pub fn new(source: Q, processor: JobProcessor<S, R>, interval: Duration) -> Self {
        Self {
            source,
            processor,
            interval,
        }
    }

    pub fn source(&self) -> &Q {
        &self.source
    }

    pub fn processor(&self) -> &JobProcessor<S, R> {
        &self.processor
    }

    /// Run a single fetch and, if a job arrived, process it
    pub async fn poll_once(&self) -> PollOutcome {
        match self.source.fetch_next().await {
            Ok(None) => {
                debug!("No job available");
                PollOutcome::NoJob
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch job");
                PollOutcome::FetchFailed
            }
            Ok(Some(job)) => {
                info!(job_id = %job.id, "Job received");
                PollOutcome::Processed(self.processor.process(&job).await)
            }
        }
    }

    /// Poll immediately, then on every interval tick until `shutdown` fires
    ///
    /// Shutdown is only observed between cycles; a job in flight always
    /// reaches its terminal report first.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = self.interval.as_millis() as u64, "Poller started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Poller shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(panic) = AssertUnwindSafe(self.poll_once()).catch_unwind().await {
                        error!(panic = %panic_message(panic.as_ref()), "Poll cycle panicked, continuing");
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
