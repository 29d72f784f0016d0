//! Shared types for the spool print agent
//!
//! Wire models exchanged with the print queue: jobs, their status, and the
//! invoice payload embedded in each job.

pub mod models;

// Re-exports
pub use models::{Amount, JobStatus, LineItem, MarkJobRequest, PrintData, PrintJob};
pub use serde::{Deserialize, Serialize};
