//! Print Job Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// Job status as tracked by the queue
///
/// `Pending` and `Processing` are owned by the queue; the agent only ever
/// reports `Printed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Printed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Printed => "printed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A print job fetched from the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    /// Server-assigned id, numeric ids are kept as their decimal text
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub printer_id: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    /// Invoice payload, decoded into `PrintData` at render time
    #[serde(default)]
    pub print_data: Option<Value>,
}

impl PrintJob {
    /// Whether the job carries a non-empty print payload
    pub fn has_print_data(&self) -> bool {
        match &self.print_data {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

/// Body of the mark-printed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkJobRequest {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MarkJobRequest {
    pub fn printed() -> Self {
        Self {
            status: JobStatus::Printed,
            error_message: None,
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            error_message: Some(error_message.into()),
        }
    }
}
