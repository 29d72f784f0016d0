//! Job processor
//!
//! Drives one job through render and print attempts until it succeeds or
//! the retry bound is reached, then reports exactly one terminal status.
//!
//! ```text
//! NotStarted → Attempting(1) → Succeeded(n)
//!                    ↓ error, n < max
//!              Attempting(n + 1)
//!                    ↓ error, n == max
//!                 Failed
//! ```

use std::time::Duration;

use shared::{JobStatus, PrintJob};
use spool_printer::DeviceSink;
use tracing::{error, info, instrument, warn};

use super::renderer::InvoiceRenderer;
use crate::error::AttemptError;
use crate::queue::JobReporter;

/// Delay growth between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles after each failure, capped at `max`
    Exponential { max: Duration },
}

/// Attempt bound and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    backoff: Backoff,
}

impl RetryPolicy {
    /// `max_retries` is the total number of attempts and is at least 1
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max } => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                self.delay.saturating_mul(factor).min(max)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Position of a job in the retry state machine
#[derive(Debug)]
enum AttemptState {
    NotStarted,
    Attempting(u32),
    Succeeded(u32),
    Failed { attempts: u32, error: AttemptError },
}

/// Terminal result of processing one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Printed {
        attempts: u32,
        reported: bool,
    },
    Failed {
        attempts: u32,
        error: String,
        reported: bool,
    },
}

impl JobOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Printed { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}

/// Renders jobs, drives the device and reports the result
pub struct JobProcessor<S, R> {
    sink: S,
    reporter: R,
    renderer: InvoiceRenderer,
    policy: RetryPolicy,
}

impl<S: DeviceSink, R: JobReporter> JobProcessor<S, R> {
    pub fn new(sink: S, reporter: R, renderer: InvoiceRenderer, policy: RetryPolicy) -> Self {
        Self {
            sink,
            reporter,
            renderer,
            policy,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Process one job to a terminal state
    ///
    /// Never returns an error: failures end in a `failed` report instead.
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn process(&self, job: &PrintJob) -> JobOutcome {
        let max_retries = self.policy.max_retries();
        let mut state = AttemptState::NotStarted;

        loop {
            state = match state {
                AttemptState::NotStarted => AttemptState::Attempting(1),

                AttemptState::Attempting(attempt) => match self.attempt(job).await {
                    Ok(()) => AttemptState::Succeeded(attempt),
                    Err(e) if attempt < max_retries => {
                        let delay = self.policy.delay_after(attempt);
                        warn!(
                            attempt,
                            max_retries,
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            "Print attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        AttemptState::Attempting(attempt + 1)
                    }
                    Err(e) => {
                        warn!(attempt, max_retries, error = %e, "Print attempt failed");
                        AttemptState::Failed {
                            attempts: attempt,
                            error: e,
                        }
                    }
                },

                AttemptState::Succeeded(attempts) => {
                    info!(attempts, "Job printed");
                    let reported = self.reporter.report(&job.id, JobStatus::Printed, None).await;
                    return JobOutcome::Printed { attempts, reported };
                }

                AttemptState::Failed { attempts, error } => {
                    let message = error.to_string();
                    error!(attempts, error = %message, "Job failed after all attempts");
                    let reported = self
                        .reporter
                        .report(&job.id, JobStatus::Failed, Some(&message))
                        .await;
                    return JobOutcome::Failed {
                        attempts,
                        error: message,
                        reported,
                    };
                }
            };
        }
    }

    /// One render and print pass
    async fn attempt(&self, job: &PrintJob) -> Result<(), AttemptError> {
        let directives = self.renderer.render_job(job)?;
        self.sink.submit(&directives).await?;
        Ok(())
    }
}
