//! HTTP client for the remote print queue

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use shared::{MarkJobRequest, PrintJob};
use tracing::{debug, instrument, warn};

use crate::config::AgentConfig;
use crate::error::{ConfigError, FetchError, ReportError};

/// Header carrying the printer's static credential
pub const PRINTER_KEY_HEADER: &str = "X-Printer-Key";

/// Queue API client scoped to one printer
///
/// Every request carries the credential header and is bounded by the
/// configured request timeout.
#[derive(Clone)]
pub struct QueueClient {
    http: Client,
    base_url: Url,
    printer_id: String,
    credential: String,
}

impl QueueClient {
    pub fn new(
        base_url: &str,
        printer_id: impl Into<String>,
        credential: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|_| ConfigError::Invalid {
            key: "QUEUE_BASE_URL",
            value: base_url.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                key: "QUEUE_BASE_URL",
                value: base_url.to_string(),
            });
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: parsed,
            printer_id: printer_id.into(),
            credential: credential.into(),
        })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.base_url,
            config.printer_id.clone(),
            config.credential.clone(),
            config.request_timeout(),
        )
    }

    /// Base URL extended by path segments, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // base URLs are checked in `new`, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Ask the queue for the next job assigned to this printer
    ///
    /// `204`, an empty body, `null`, `{}` and jobs without print data all
    /// mean there is nothing to print.
    #[instrument(skip(self), fields(printer_id = %self.printer_id))]
    pub async fn fetch_next(&self) -> Result<Option<PrintJob>, FetchError> {
        let response = self
            .http
            .get(self.endpoint(&["printers", "jobs"]))
            .query(&[("printer_id", self.printer_id.as_str())])
            .header(PRINTER_KEY_HEADER, &self.credential)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => return Ok(None),
            StatusCode::OK => {}
            status => return Err(FetchError::Status(status)),
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(&body)?;
        match &value {
            Value::Null => return Ok(None),
            Value::Object(map) if map.is_empty() => return Ok(None),
            _ => {}
        }

        let job: PrintJob = serde_json::from_value(value)?;
        if !job.has_print_data() {
            warn!(job_id = %job.id, "Job has no print data, ignoring");
            return Ok(None);
        }

        debug!(job_id = %job.id, "Job fetched");
        Ok(Some(job))
    }

    /// Post a terminal status for a job
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn mark_job(&self, job_id: &str, request: &MarkJobRequest) -> Result<(), ReportError> {
        let response = self
            .http
            .post(self.endpoint(&["printers", "jobs", job_id, "mark-printed"]))
            .header(PRINTER_KEY_HEADER, &self.credential)
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ReportError::Status(status)),
        }
    }
}

impl std::fmt::Debug for QueueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueClient")
            .field("base_url", &self.base_url.as_str())
            .field("printer_id", &self.printer_id)
            .finish_non_exhaustive()
    }
}
