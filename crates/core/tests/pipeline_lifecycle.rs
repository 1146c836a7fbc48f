//! Pipeline lifecycle integration tests.
//!
//! These tests verify the job pipeline with mock stage capabilities:
//! - Status state machine transitions (queued -> processing -> terminal)
//! - Transcript record upsert idempotence
//! - Transient media/audio cleanup on success and failure
//! - Language detection fallback
//! - Tolerance of concurrently deleted job records

use std::sync::Arc;

use tempfile::TempDir;

use lectern_core::{
    config::WorkerConfig,
    queue::TranscriptionRequest,
    records::{ArtifactKind, Job, JobStatus, RecordStore, SqliteRecordStore, User},
    storage::Storage,
    testing::{MockDetector, MockExtractor, MockFetcher, MockTranscriber},
    worker::{JobPipeline, RunOutcome},
    ExtractError, FetchError,
};

/// Test helper wiring the pipeline to mocks and an in-memory record store.
struct TestHarness {
    records: Arc<SqliteRecordStore>,
    fetcher: Arc<MockFetcher>,
    extractor: Arc<MockExtractor>,
    transcriber: Arc<MockTranscriber>,
    detector: Arc<MockDetector>,
    pipeline: JobPipeline,
    work_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let work_dir = TempDir::new().expect("Failed to create work dir");
        let records = Arc::new(SqliteRecordStore::in_memory().expect("Failed to create store"));
        let storage = Arc::new(Storage::local(work_dir.path()));
        let fetcher = Arc::new(MockFetcher::new());
        let extractor = Arc::new(MockExtractor::new());
        let transcriber = Arc::new(MockTranscriber::new());
        let detector = Arc::new(MockDetector::new());

        let config = WorkerConfig {
            work_dir: work_dir.path().to_path_buf(),
            default_language: "en".to_string(),
            error_backoff_secs: 1,
        };

        let pipeline = JobPipeline::new(
            Arc::clone(&records) as Arc<dyn RecordStore>,
            storage,
            Arc::clone(&fetcher) as _,
            Arc::clone(&extractor) as _,
            Arc::clone(&transcriber) as _,
            Arc::clone(&detector) as _,
            config,
        );

        Self {
            records,
            fetcher,
            extractor,
            transcriber,
            detector,
            pipeline,
            work_dir,
        }
    }

    fn create_job(&self, url: &str) -> (User, Job) {
        let user = self
            .records
            .find_or_create_user("tester@example.com")
            .expect("Failed to create user");
        let job = self
            .records
            .create_job(user.id, url)
            .expect("Failed to create job");
        (user, job)
    }

    fn request_for(&self, job: &Job) -> TranscriptionRequest {
        TranscriptionRequest {
            video_id: job.id,
            url: job.url.clone(),
            user_id: "tester@example.com".to_string(),
        }
    }

    fn job_status(&self, id: i64) -> JobStatus {
        self.records.get_job(id).unwrap().unwrap().status
    }
}

#[tokio::test]
async fn test_successful_run_reaches_completed() {
    let harness = TestHarness::new();
    harness.fetcher.set_title("Rust Ownership Talk").await;
    let (_, job) = harness.create_job("https://example.com/v/1");

    let outcome = harness
        .pipeline
        .run(&harness.request_for(&job))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(harness.job_status(job.id), JobStatus::Completed);

    // Title overwritten with what retrieval reported.
    let updated = harness.records.get_job(job.id).unwrap().unwrap();
    assert_eq!(updated.title, "Rust Ownership Talk");
}

#[tokio::test]
async fn test_transcript_record_committed_with_detected_language() {
    let harness = TestHarness::new();
    harness.detector.set_language("it").await;
    let (_, job) = harness.create_job("https://example.com/v/2");

    harness
        .pipeline
        .run(&harness.request_for(&job))
        .await
        .unwrap();

    let artifacts = harness
        .records
        .list_artifacts(ArtifactKind::Transcript, job.id)
        .unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].language, "it");

    // Local backend: the location is a readable path to the document.
    let content = std::fs::read_to_string(&artifacts[0].location).unwrap();
    assert!(content.contains("Test Video"));
}

#[tokio::test]
async fn test_transient_media_and_audio_are_reclaimed() {
    let harness = TestHarness::new();
    let (_, job) = harness.create_job("https://example.com/v/3");

    harness
        .pipeline
        .run(&harness.request_for(&job))
        .await
        .unwrap();

    let job_dir = harness
        .work_dir
        .path()
        .join("tester@example.com")
        .join(job.id.to_string());
    assert!(!job_dir.join("Test Video.mp4").exists());
    assert!(!job_dir.join("Test Video.mp3").exists());
    // Only the transcript artifact remains addressable.
    assert!(job_dir.join("Test Video.txt").exists());
}

#[tokio::test]
async fn test_running_twice_upserts_single_artifact() {
    let harness = TestHarness::new();
    let (_, job) = harness.create_job("https://example.com/v/4");
    let request = harness.request_for(&job);

    harness.pipeline.run(&request).await.unwrap();
    let first = harness
        .records
        .list_artifacts(ArtifactKind::Transcript, job.id)
        .unwrap();

    harness.pipeline.run(&request).await.unwrap();
    let second = harness
        .records
        .list_artifacts(ArtifactKind::Transcript, job.id)
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].id, second[0].id);
    assert_eq!(harness.job_status(job.id), JobStatus::Completed);
}

#[tokio::test]
async fn test_stage_failure_marks_job_failed() {
    let harness = TestHarness::new();
    let (_, job) = harness.create_job("https://example.com/v/5");
    harness
        .extractor
        .set_next_error(ExtractError::failed("no audio track", None))
        .await;

    let result = harness.pipeline.run(&harness.request_for(&job)).await;

    assert!(result.is_err());
    // Never left at processing or queued.
    assert_eq!(harness.job_status(job.id), JobStatus::Failed);
    // No artifact committed.
    assert!(harness
        .records
        .list_artifacts(ArtifactKind::Transcript, job.id)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_failure_still_cleans_up_transients() {
    let harness = TestHarness::new();
    let (_, job) = harness.create_job("https://example.com/v/6");
    harness
        .transcriber
        .set_next_error(lectern_core::TranscribeError::failed("model crashed", None))
        .await;

    let _ = harness.pipeline.run(&harness.request_for(&job)).await;

    let job_dir = harness
        .work_dir
        .path()
        .join("tester@example.com")
        .join(job.id.to_string());
    // Media and audio were produced before the failing stage; both gone.
    assert!(!job_dir.join("Test Video.mp4").exists());
    assert!(!job_dir.join("Test Video.mp3").exists());
}

#[tokio::test]
async fn test_retrieval_failure_marks_failed_without_downstream_stages() {
    let harness = TestHarness::new();
    let (_, job) = harness.create_job("https://example.com/v/7");
    harness
        .fetcher
        .set_next_error(FetchError::failed("403 from origin", None))
        .await;

    let result = harness.pipeline.run(&harness.request_for(&job)).await;

    assert!(result.is_err());
    assert_eq!(harness.job_status(job.id), JobStatus::Failed);
    assert!(harness.extractor.recorded_extractions().await.is_empty());
    assert!(harness
        .transcriber
        .recorded_transcriptions()
        .await
        .is_empty());
}

#[tokio::test]
async fn test_detector_failure_falls_back_to_default_language() {
    let harness = TestHarness::new();
    harness.detector.set_failing().await;
    let (_, job) = harness.create_job("https://example.com/v/8");

    let outcome = harness
        .pipeline
        .run(&harness.request_for(&job))
        .await
        .unwrap();

    // Detection failure is never fatal.
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(harness.job_status(job.id), JobStatus::Completed);

    let artifacts = harness
        .records
        .list_artifacts(ArtifactKind::Transcript, job.id)
        .unwrap();
    assert_eq!(artifacts[0].language, "en");
}

#[tokio::test]
async fn test_detector_receives_stripped_sample() {
    let harness = TestHarness::new();
    harness
        .transcriber
        .set_body("[00:01] first words\n[00:09] more words")
        .await;
    let (_, job) = harness.create_job("https://example.com/v/9");

    harness
        .pipeline
        .run(&harness.request_for(&job))
        .await
        .unwrap();

    let samples = harness.detector.recorded_samples().await;
    assert_eq!(samples.len(), 1);
    assert!(samples[0].contains("first words"));
    assert!(!samples[0].contains("[00:01]"));
}

#[tokio::test]
async fn test_vanished_job_is_skipped_not_crashed() {
    let harness = TestHarness::new();
    let request = TranscriptionRequest {
        video_id: 424242,
        url: "https://example.com/gone".to_string(),
        user_id: "tester@example.com".to_string(),
    };

    let outcome = harness.pipeline.run(&request).await.unwrap();

    assert_eq!(outcome, RunOutcome::JobVanished);
    // No stage ever ran.
    assert_eq!(harness.fetcher.fetch_count().await, 0);
}
