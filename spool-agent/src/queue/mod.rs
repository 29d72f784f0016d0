//! Remote print queue access

mod client;
mod reporter;

pub use client::{PRINTER_KEY_HEADER, QueueClient};
pub use reporter::JobReporter;

use shared::PrintJob;

use crate::error::FetchError;

/// Source of print jobs for this printer
#[allow(async_fn_in_trait)]
pub trait JobSource {
    /// Fetch at most one job, `None` when nothing is waiting
    async fn fetch_next(&self) -> Result<Option<PrintJob>, FetchError>;
}

impl JobSource for QueueClient {
    async fn fetch_next(&self) -> Result<Option<PrintJob>, FetchError> {
        QueueClient::fetch_next(self).await
    }
}
