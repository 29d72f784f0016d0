//! # spool-agent
//!
//! Print-job agent: polls a remote queue for invoices assigned to one
//! printer, renders them to ESC/POS and reports the outcome.
//!
//! ## Flow
//!
//! ```text
//! QueueClient::fetch_next ─→ JobProcessor::process ─→ DeviceSink::submit
//!                                   │
//!                                   └─→ JobReporter::report
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod printing;
pub mod queue;

#[cfg(test)]
mod test_support;

pub use config::{AgentConfig, BackoffMode, DeviceConfig};
pub use error::{AttemptError, ConfigError, FetchError, RenderError, ReportError};
pub use logger::init_logger;
pub use printing::{
    Backoff, InvoiceRenderer, JobOutcome, JobProcessor, PollOutcome, Poller, RetryPolicy,
};
pub use queue::{JobReporter, JobSource, PRINTER_KEY_HEADER, QueueClient};
