//! Agent against an in-process queue server

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shared::JobStatus;
use spool_agent::{
    InvoiceRenderer, JobOutcome, JobProcessor, JobReporter, PRINTER_KEY_HEADER, PollOutcome,
    Poller, QueueClient, RetryPolicy,
};
use spool_printer::{DeviceConnection, DeviceSink, PrintError, PrintResult, TextEncoding};

const PRINTER_ID: &str = "front-desk";
const KEY: &str = "secret";

#[derive(Debug, Clone)]
struct Mark {
    job_id: String,
    key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct MockQueue {
    fetch_responses: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    fetch_delay: Duration,
    mark_status: StatusCode,
    fetch_queries: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    marks: Arc<Mutex<Vec<Mark>>>,
}

impl MockQueue {
    fn new(responses: Vec<(StatusCode, String)>) -> Self {
        Self {
            fetch_responses: Arc::new(Mutex::new(responses.into())),
            fetch_delay: Duration::ZERO,
            mark_status: StatusCode::OK,
            fetch_queries: Arc::default(),
            marks: Arc::default(),
        }
    }

    fn marks(&self) -> Vec<Mark> {
        self.marks.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fetch_job(
    State(queue): State<MockQueue>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    queue.fetch_queries.lock().unwrap().push((
        params.get("printer_id").cloned(),
        header(&headers, PRINTER_KEY_HEADER),
    ));
    if !queue.fetch_delay.is_zero() {
        tokio::time::sleep(queue.fetch_delay).await;
    }
    queue
        .fetch_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::NO_CONTENT, String::new()))
}

async fn mark_job(
    State(queue): State<MockQueue>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    queue.marks.lock().unwrap().push(Mark {
        job_id,
        key: header(&headers, PRINTER_KEY_HEADER),
        body,
    });
    queue.mark_status
}

async fn spawn_queue(queue: MockQueue) -> SocketAddr {
    let app = Router::new()
        .route("/api/printers/jobs", get(fetch_job))
        .route("/api/printers/jobs/{id}/mark-printed", post(mark_job))
        .with_state(queue);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, timeout: Duration) -> QueueClient {
    QueueClient::new(&format!("http://{}/api", addr), PRINTER_ID, KEY, timeout).unwrap()
}

/// Printer that captures bytes in memory, optionally failing every open
#[derive(Clone, Default)]
struct MemorySink {
    fail: bool,
    opens: Arc<AtomicU32>,
    data: Arc<Mutex<Vec<u8>>>,
}

struct MemoryConnection {
    data: Arc<Mutex<Vec<u8>>>,
}

impl DeviceConnection for MemoryConnection {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        self.data.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    async fn close(self) -> PrintResult<()> {
        Ok(())
    }
}

impl DeviceSink for MemorySink {
    type Connection = MemoryConnection;

    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn encoding(&self) -> TextEncoding {
        TextEncoding::Utf8
    }

    async fn open(&self) -> PrintResult<Self::Connection> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PrintError::Connection("paper out".to_string()));
        }
        Ok(MemoryConnection {
            data: self.data.clone(),
        })
    }
}

fn poller(
    client: QueueClient,
    sink: MemorySink,
) -> Poller<QueueClient, MemorySink, QueueClient> {
    let processor = JobProcessor::new(
        sink,
        client.clone(),
        InvoiceRenderer::default(),
        RetryPolicy::new(3, Duration::from_millis(10)),
    );
    Poller::new(client, processor, Duration::from_secs(5))
}

fn job_body(id: Value) -> String {
    json!({
        "id": id,
        "printer_id": PRINTER_ID,
        "status": "processing",
        "print_data": {
            "company_name": "Acme",
            "products": [{"name": "Tea", "quantity": 2, "price": "5.50"}],
            "total": "11.00"
        }
    })
    .to_string()
}

#[tokio::test]
async fn no_content_means_no_job() {
    let queue = MockQueue::new(vec![(StatusCode::NO_CONTENT, String::new())]);
    let addr = spawn_queue(queue.clone()).await;
    let sink = MemorySink::default();
    let p = poller(client(addr, Duration::from_secs(5)), sink.clone());

    assert_eq!(p.poll_once().await, PollOutcome::NoJob);

    assert_eq!(sink.opens.load(Ordering::SeqCst), 0);
    assert!(queue.marks().is_empty());
    let queries = queue.fetch_queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![(Some(PRINTER_ID.to_string()), Some(KEY.to_string()))]
    );
}

#[tokio::test]
async fn empty_bodies_mean_no_job() {
    let queue = MockQueue::new(vec![
        (StatusCode::OK, String::new()),
        (StatusCode::OK, "null".to_string()),
        (StatusCode::OK, "{}".to_string()),
        (StatusCode::OK, json!({"id": 5, "print_data": {}}).to_string()),
    ]);
    let addr = spawn_queue(queue.clone()).await;
    let p = poller(client(addr, Duration::from_secs(5)), MemorySink::default());

    for _ in 0..4 {
        assert_eq!(p.poll_once().await, PollOutcome::NoJob);
    }
    assert!(queue.marks().is_empty());
}

#[tokio::test]
async fn server_error_is_transient() {
    let queue = MockQueue::new(vec![
        (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        (StatusCode::OK, "not json".to_string()),
    ]);
    let addr = spawn_queue(queue.clone()).await;
    let p = poller(client(addr, Duration::from_secs(5)), MemorySink::default());

    assert_eq!(p.poll_once().await, PollOutcome::FetchFailed);
    assert_eq!(p.poll_once().await, PollOutcome::FetchFailed);
    assert_eq!(p.poll_once().await, PollOutcome::NoJob);
    assert!(queue.marks().is_empty());
}

#[tokio::test]
async fn slow_queue_times_out() {
    let mut queue = MockQueue::new(vec![(StatusCode::OK, job_body(json!(1)))]);
    queue.fetch_delay = Duration::from_secs(2);
    let addr = spawn_queue(queue.clone()).await;
    let p = poller(client(addr, Duration::from_millis(200)), MemorySink::default());

    assert_eq!(p.poll_once().await, PollOutcome::FetchFailed);
}

#[tokio::test]
async fn job_is_printed_and_marked() {
    let queue = MockQueue::new(vec![(StatusCode::OK, job_body(json!(42)))]);
    let addr = spawn_queue(queue.clone()).await;
    let sink = MemorySink::default();
    let p = poller(client(addr, Duration::from_secs(5)), sink.clone());

    let outcome = p.poll_once().await;

    assert_eq!(
        outcome,
        PollOutcome::Processed(JobOutcome::Printed {
            attempts: 1,
            reported: true
        })
    );

    let printed = String::from_utf8_lossy(&sink.data.lock().unwrap()).to_string();
    assert!(printed.contains("Acme"));
    assert!(printed.contains("Tea               2   5.50    11.00   "));
    assert!(printed.contains("TOTAL: 11.00"));

    let marks = queue.marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].job_id, "42");
    assert_eq!(marks[0].key.as_deref(), Some(KEY));
    assert_eq!(marks[0].body, json!({"status": "printed"}));
}

#[tokio::test]
async fn failing_device_reports_failure_once() {
    let queue = MockQueue::new(vec![(StatusCode::OK, job_body(json!("job-9")))]);
    let addr = spawn_queue(queue.clone()).await;
    let sink = MemorySink {
        fail: true,
        ..Default::default()
    };
    let p = poller(client(addr, Duration::from_secs(5)), sink.clone());

    let outcome = p.poll_once().await;

    assert!(matches!(
        outcome,
        PollOutcome::Processed(JobOutcome::Failed { attempts: 3, reported: true, .. })
    ));
    assert_eq!(sink.opens.load(Ordering::SeqCst), 3);

    let marks = queue.marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].job_id, "job-9");
    assert_eq!(
        marks[0].body,
        json!({
            "status": "failed",
            "error_message": "Device error: Connection failed: paper out"
        })
    );
}

#[tokio::test]
async fn rejected_report_returns_false() {
    let mut queue = MockQueue::new(vec![]);
    queue.mark_status = StatusCode::INTERNAL_SERVER_ERROR;
    let addr = spawn_queue(queue.clone()).await;
    let client = client(addr, Duration::from_secs(5));

    let acknowledged = client.report("77", JobStatus::Printed, None).await;

    assert!(!acknowledged);
    assert_eq!(queue.marks().len(), 1);
}

#[tokio::test]
async fn opaque_job_id_stays_one_path_segment() {
    let queue = MockQueue::new(vec![]);
    let addr = spawn_queue(queue.clone()).await;
    let client = client(addr, Duration::from_secs(5));

    assert!(client.report("inv/7?x#1", JobStatus::Printed, None).await);

    let marks = queue.marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].job_id, "inv/7?x#1");
}

#[tokio::test]
async fn unreachable_queue_report_returns_false() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client(addr, Duration::from_secs(1));

    assert!(!client.report("1", JobStatus::Failed, Some("x")).await);
}
