//! Common test utilities for E2E testing with mocks.
//!
//! Provides a test fixture that creates an in-process server with mock
//! dependencies injected, plus a worker wired to the same queue and record
//! store so tests can drive jobs end to end without external tooling.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use lectern_core::{
    config::WorkerConfig, testing::MockDetector, testing::MockExtractor, testing::MockFetcher,
    testing::MockLlm, testing::MockTranscriber, testing::MockTranslationProvider, Config,
    JobPipeline, JobQueue, RecordStore, SqliteJobQueue, SqliteRecordStore, Storage,
    StudyContentGenerator, TranscriptTranslator, Worker,
};
use lectern_server::api::create_router;
use lectern_server::state::AppState;

/// Test fixture for E2E testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for in-process requests
    pub router: Router,
    /// Worker wired to the same queue/records/storage as the API
    pub worker: Worker,
    /// Queue shared by API and worker
    pub queue: Arc<SqliteJobQueue>,
    /// Record store shared by API and worker
    pub records: Arc<SqliteRecordStore>,
    /// Mock LLM behind the study content generator
    pub llm: Arc<MockLlm>,
    /// Mock translation provider behind the translator
    pub translation: Arc<MockTranslationProvider>,
    /// Mock transcriber (controls transcript bodies)
    pub transcriber: Arc<MockTranscriber>,
    /// Temporary directory for database and work files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture with translator and generator configured (mock-backed).
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Fixture without translator/generator, for unavailability paths.
    pub async fn bare() -> Self {
        Self::build(false).await
    }

    async fn build(with_derivations: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let records =
            Arc::new(SqliteRecordStore::in_memory().expect("Failed to create record store"));
        let queue = Arc::new(
            SqliteJobQueue::in_memory(Duration::from_secs(60), Duration::from_millis(10))
                .expect("Failed to create queue"),
        );
        let storage = Arc::new(Storage::local(temp_dir.path()));

        let worker_config = WorkerConfig {
            work_dir: temp_dir.path().to_path_buf(),
            default_language: "en".to_string(),
            error_backoff_secs: 1,
        };

        let llm = Arc::new(MockLlm::new());
        let translation = Arc::new(MockTranslationProvider::new());

        let (translator, generator) = if with_derivations {
            (
                Some(Arc::new(TranscriptTranslator::new(
                    Arc::clone(&translation) as _,
                    4500,
                ))),
                Some(Arc::new(StudyContentGenerator::new(
                    Arc::clone(&llm) as _
                ))),
            )
        } else {
            (None, None)
        };

        let mut config = Config::default();
        config.worker = worker_config.clone();

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&records) as Arc<dyn RecordStore>,
            Arc::clone(&storage),
            Arc::clone(&queue) as Arc<dyn JobQueue>,
            translator,
            generator,
        ));

        let router = create_router(state);

        let transcriber = Arc::new(MockTranscriber::new());
        let pipeline = Arc::new(JobPipeline::new(
            Arc::clone(&records) as Arc<dyn RecordStore>,
            storage,
            Arc::new(MockFetcher::new()) as _,
            Arc::new(MockExtractor::new()) as _,
            Arc::clone(&transcriber) as _,
            Arc::new(MockDetector::new()) as _,
            worker_config.clone(),
        ));
        let worker = Worker::new(
            Arc::clone(&queue) as Arc<dyn JobQueue>,
            pipeline,
            worker_config,
        );

        Self {
            router,
            worker,
            queue,
            records,
            llm,
            translation,
            transcriber,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };

        TestResponse { status, body }
    }
}
