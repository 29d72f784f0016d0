//! Print pipeline
//!
//! - [`renderer`]: invoice payload → directives
//! - [`processor`]: retry state machine around render and device I/O
//! - [`poller`]: fixed-cadence fetch loop feeding the processor

pub mod money;
pub mod poller;
pub mod processor;
pub mod renderer;

pub use poller::{PollOutcome, Poller};
pub use processor::{Backoff, JobOutcome, JobProcessor, RetryPolicy};
pub use renderer::InvoiceRenderer;
