//! In-memory collaborators for unit tests

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::json;
use shared::{JobStatus, PrintJob};
use spool_printer::{DeviceConnection, DeviceSink, PrintError, PrintResult};

use crate::error::FetchError;
use crate::queue::{JobReporter, JobSource};

pub fn sample_job(id: &str) -> PrintJob {
    serde_json::from_value(json!({
        "id": id,
        "print_data": {
            "company_name": "Acme",
            "products": [{"name": "Tea", "quantity": 2, "price": "5.50"}],
            "total": "11.00"
        }
    }))
    .unwrap()
}

/// Device whose first `fail_first` opens fail with `NotFound`
pub struct FakeSink {
    fail_first: u32,
    opens: AtomicU32,
    writes: Arc<AtomicU32>,
}

impl FakeSink {
    pub fn failing(fail_first: u32) -> Self {
        Self {
            fail_first,
            opens: AtomicU32::new(0),
            writes: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

pub struct FakeConnection {
    writes: Arc<AtomicU32>,
}

impl DeviceConnection for FakeConnection {
    async fn write(&mut self, _data: &[u8]) -> PrintResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self) -> PrintResult<()> {
        Ok(())
    }
}

impl DeviceSink for FakeSink {
    type Connection = FakeConnection;

    fn describe(&self) -> String {
        "fake".to_string()
    }

    async fn open(&self) -> PrintResult<Self::Connection> {
        let attempt = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_first {
            return Err(PrintError::NotFound(format!("fake attempt {}", attempt)));
        }
        Ok(FakeConnection {
            writes: self.writes.clone(),
        })
    }
}

type Report = (String, JobStatus, Option<String>);

/// Reporter that records every call
pub struct RecordingReporter {
    accept: bool,
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl Default for RecordingReporter {
    fn default() -> Self {
        Self {
            accept: true,
            reports: Mutex::new(Vec::new()),
        }
    }
}

impl JobReporter for RecordingReporter {
    async fn report(&self, job_id: &str, status: JobStatus, error_message: Option<&str>) -> bool {
        self.reports.lock().unwrap().push((
            job_id.to_string(),
            status,
            error_message.map(str::to_string),
        ));
        self.accept
    }
}

/// Job source replaying scripted fetch results, then `None`
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Option<PrintJob>, FetchError>>>,
    fetches: AtomicU32,
    panic_on_fetch: bool,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Option<PrintJob>, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_fetch: true,
            ..Default::default()
        }
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl JobSource for ScriptedSource {
    async fn fetch_next(&self) -> Result<Option<PrintJob>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_fetch {
            panic!("scripted fetch panic");
        }
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}
