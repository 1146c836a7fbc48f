//! Worker loop integration tests.
//!
//! These tests verify the consumer's acknowledgement policy and liveness:
//! - Messages are deleted on success AND on pipeline failure
//! - Malformed bodies are left for the queue's redelivery policy
//! - One bad job never stops the loop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use lectern_core::{
    config::WorkerConfig,
    queue::{JobQueue, QueueError, QueueMessage, TranscriptionRequest},
    records::{RecordStore, SqliteRecordStore},
    storage::Storage,
    testing::{MockDetector, MockExtractor, MockFetcher, MockTranscriber},
    worker::{JobPipeline, PollOutcome, Worker},
    ExtractError,
};

/// In-memory queue that counts delete calls.
struct CountingQueue {
    messages: Mutex<VecDeque<QueueMessage>>,
    deletes: AtomicUsize,
}

impl CountingQueue {
    fn new() -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            deletes: AtomicUsize::new(0),
        }
    }

    fn push_raw(&self, body: &str) {
        let mut messages = self.messages.lock().unwrap();
        let receipt_handle = format!("receipt-{}", messages.len());
        messages.push_back(QueueMessage {
            receipt_handle,
            body: body.to_string(),
        });
    }

    fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobQueue for CountingQueue {
    async fn send(&self, request: &TranscriptionRequest) -> Result<(), QueueError> {
        let body = serde_json::to_string(request).unwrap();
        self.push_raw(&body);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<QueueMessage>, QueueError> {
        Ok(self.messages.lock().unwrap().pop_front())
    }

    async fn delete(&self, _receipt_handle: &str) -> Result<(), QueueError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Worker wired to mocks, a counting queue and an in-memory record store.
struct TestHarness {
    records: Arc<SqliteRecordStore>,
    queue: Arc<CountingQueue>,
    fetcher: Arc<MockFetcher>,
    extractor: Arc<MockExtractor>,
    worker: Worker,
    _work_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let work_dir = TempDir::new().expect("Failed to create work dir");
        let records = Arc::new(SqliteRecordStore::in_memory().expect("Failed to create store"));
        let storage = Arc::new(Storage::local(work_dir.path()));
        let queue = Arc::new(CountingQueue::new());
        let fetcher = Arc::new(MockFetcher::new());
        let extractor = Arc::new(MockExtractor::new());

        let config = WorkerConfig {
            work_dir: work_dir.path().to_path_buf(),
            default_language: "en".to_string(),
            error_backoff_secs: 1,
        };

        let pipeline = Arc::new(JobPipeline::new(
            Arc::clone(&records) as Arc<dyn RecordStore>,
            storage,
            Arc::clone(&fetcher) as _,
            Arc::clone(&extractor) as _,
            Arc::new(MockTranscriber::new()) as _,
            Arc::new(MockDetector::new()) as _,
            config.clone(),
        ));

        let worker = Worker::new(Arc::clone(&queue) as Arc<dyn JobQueue>, pipeline, config);

        Self {
            records,
            queue,
            fetcher,
            extractor,
            worker,
            _work_dir: work_dir,
        }
    }

    async fn enqueue_job(&self, url: &str) -> i64 {
        let user = self
            .records
            .find_or_create_user("tester@example.com")
            .unwrap();
        let job = self.records.create_job(user.id, url).unwrap();
        self.queue
            .send(&TranscriptionRequest {
                video_id: job.id,
                url: url.to_string(),
                user_id: "tester@example.com".to_string(),
            })
            .await
            .unwrap();
        job.id
    }
}

#[tokio::test]
async fn test_idle_poll_is_normal() {
    let harness = TestHarness::new();
    assert_eq!(harness.worker.poll_once().await, PollOutcome::Idle);
}

#[tokio::test]
async fn test_message_deleted_on_success() {
    let harness = TestHarness::new();
    harness.enqueue_job("https://example.com/v/1").await;

    assert_eq!(harness.worker.poll_once().await, PollOutcome::Handled);
    assert_eq!(harness.queue.delete_count(), 1);
}

#[tokio::test]
async fn test_message_deleted_on_failure_too() {
    let harness = TestHarness::new();
    harness.enqueue_job("https://example.com/v/1").await;
    harness
        .extractor
        .set_next_error(ExtractError::failed("boom", None))
        .await;

    assert_eq!(harness.worker.poll_once().await, PollOutcome::Handled);
    // Acknowledged despite the failure, preventing a redelivery loop.
    assert_eq!(harness.queue.delete_count(), 1);
}

#[tokio::test]
async fn test_three_deliveries_one_failing_yields_three_deletes() {
    let harness = TestHarness::new();
    harness.enqueue_job("https://example.com/v/1").await;
    let failing_id = harness.enqueue_job("https://example.com/v/2").await;
    harness.enqueue_job("https://example.com/v/3").await;

    assert_eq!(harness.worker.poll_once().await, PollOutcome::Handled);

    harness
        .extractor
        .set_next_error(ExtractError::failed("boom", None))
        .await;
    assert_eq!(harness.worker.poll_once().await, PollOutcome::Handled);

    assert_eq!(harness.worker.poll_once().await, PollOutcome::Handled);

    // Exactly three acknowledgements, and the loop is still polling.
    assert_eq!(harness.queue.delete_count(), 3);
    assert_eq!(harness.worker.poll_once().await, PollOutcome::Idle);

    // The failing job ended failed; the others completed.
    let failed = harness.records.get_job(failing_id).unwrap().unwrap();
    assert_eq!(failed.status.as_str(), "failed");
    assert_eq!(harness.fetcher.fetch_count().await, 3);
}

#[tokio::test]
async fn test_malformed_body_left_for_redelivery() {
    let harness = TestHarness::new();
    harness.queue.push_raw(r#"{"url": "https://example.com"}"#);

    assert_eq!(harness.worker.poll_once().await, PollOutcome::Malformed);
    assert_eq!(harness.queue.delete_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_run_stops_on_shutdown() {
    let harness = TestHarness::new();
    harness.enqueue_job("https://example.com/v/1").await;

    let worker = Arc::new(harness.worker);
    let runner = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    // Give the loop a moment to drain the message, then stop it.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    worker.stop();

    tokio::time::timeout(std::time::Duration::from_secs(5), runner)
        .await
        .expect("worker did not shut down")
        .unwrap();

    assert_eq!(harness.queue.delete_count(), 1);
    assert!(!worker.is_running());
}
