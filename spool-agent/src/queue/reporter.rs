//! Job status reporting

use shared::{JobStatus, MarkJobRequest};
use tracing::{error, info};

use super::client::QueueClient;

/// Sends a job's terminal status back to the queue
///
/// Returns `false` when the update was not acknowledged. Callers never
/// retry a failed report.
#[allow(async_fn_in_trait)]
pub trait JobReporter {
    async fn report(&self, job_id: &str, status: JobStatus, error_message: Option<&str>) -> bool;
}

impl JobReporter for QueueClient {
    async fn report(&self, job_id: &str, status: JobStatus, error_message: Option<&str>) -> bool {
        let request = MarkJobRequest {
            status,
            error_message: error_message.map(str::to_string),
        };

        match self.mark_job(job_id, &request).await {
            Ok(()) => {
                info!(job_id = %job_id, status = %status, "Job status reported");
                true
            }
            Err(e) => {
                error!(job_id = %job_id, status = %status, error = %e, "Failed to report job status");
                false
            }
        }
    }
}
