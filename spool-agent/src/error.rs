//! Error types for the agent
//!
//! Each component owns its error type and catches it at its boundary;
//! none of these terminate the process.

use reqwest::StatusCode;
use spool_printer::PrintError;
use thiserror::Error;

/// Invalid or missing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Job retrieval failure, retried on the next poll tick
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Invalid job payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Print data that cannot be rendered
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Job has no print data")]
    MissingPayload,

    #[error("Malformed print data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Line total out of range for item: {0}")]
    Overflow(String),
}

/// Status update rejected or unreachable, logged only
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Why one print attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Device error: {0}")]
    Device(#[from] PrintError),
}
