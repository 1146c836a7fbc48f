//! Per-job pipeline orchestration.
//!
//! Drives one job through the stage sequence:
//! fetch -> extract audio -> transcribe -> store -> detect language ->
//! commit transcript record, with the status state machine
//! `queued -> processing -> {completed, failed}` around it.
//!
//! Every stage must be safely repeatable for the same job id: redelivery of
//! an unacknowledged message re-enters `processing` and re-runs the pipeline
//! from the top, overwriting prior partial output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::WorkerConfig;
use crate::extractor::{AudioExtractor, ExtractError};
use crate::fetcher::{FetchError, MediaFetcher};
use crate::langdetect::{prepare_sample, LanguageDetector};
use crate::metrics::{JOBS_PROCESSED, STAGE_DURATION};
use crate::queue::TranscriptionRequest;
use crate::records::{ArtifactKind, ArtifactUpsert, JobStatus, RecordError, RecordStore};
use crate::storage::{Storage, StorageError};
use crate::transcriber::{TranscribeError, Transcriber};

/// Error type for a job run, tagged by the stage that raised it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Retrieval failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Audio extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Transcription failed: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Record store failed: {0}")]
    Record(#[from] RecordError),
}

impl PipelineError {
    /// Stage name for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Extract(_) => "extract",
            PipelineError::Transcribe(_) => "transcribe",
            PipelineError::Storage(_) => "store",
            PipelineError::Record(_) => "record",
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Pipeline ran to the end; job marked completed.
    Completed,
    /// A stage failed; job marked failed (if the record still existed).
    Failed,
    /// The job record was gone before processing started; nothing ran.
    JobVanished,
}

/// Orchestrates the stage capabilities for one job at a time.
pub struct JobPipeline {
    records: Arc<dyn RecordStore>,
    storage: Arc<Storage>,
    fetcher: Arc<dyn MediaFetcher>,
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
    detector: Arc<dyn LanguageDetector>,
    config: WorkerConfig,
}

impl JobPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        storage: Arc<Storage>,
        fetcher: Arc<dyn MediaFetcher>,
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        detector: Arc<dyn LanguageDetector>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            records,
            storage,
            fetcher,
            extractor,
            transcriber,
            detector,
            config,
        }
    }

    /// Run the full pipeline for one queue message.
    ///
    /// Always reaches a terminal state for this delivery: the job ends
    /// `completed` or `failed` (when its record still exists), and transient
    /// files are reclaimed on both paths. Errors are returned for logging
    /// only — the caller acknowledges the message regardless.
    pub async fn run(&self, request: &TranscriptionRequest) -> Result<RunOutcome, PipelineError> {
        let job_id = request.video_id;
        info!(job_id, url = %request.url, "processing job");

        // Commit `processing` before any stage so external readers see
        // progress. A job deleted before we got the message is skipped, not
        // an error.
        match self.records.set_status(job_id, JobStatus::Processing) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(job_id, "job record gone before processing; skipping");
                JOBS_PROCESSED.with_label_values(&["vanished"]).inc();
                return Ok(RunOutcome::JobVanished);
            }
            Err(e) => return Err(e.into()),
        }

        let mut media_path: Option<PathBuf> = None;
        let mut audio_path: Option<PathBuf> = None;

        let result = self
            .run_stages(request, &mut media_path, &mut audio_path)
            .await;

        // Storage reclamation is not optional: transients go away on success
        // and on failure.
        self.remove_transient(media_path.as_deref()).await;
        self.remove_transient(audio_path.as_deref()).await;

        match result {
            Ok(()) => {
                self.finish(job_id, JobStatus::Completed);
                JOBS_PROCESSED.with_label_values(&["completed"]).inc();
                info!(job_id, "job completed");
                Ok(RunOutcome::Completed)
            }
            Err(e) => {
                self.finish(job_id, JobStatus::Failed);
                JOBS_PROCESSED.with_label_values(&["failed"]).inc();
                warn!(job_id, stage = e.stage(), error = %e, "job failed");
                Err(e)
            }
        }
    }

    /// Steps 2-8: the fallible middle of the run.
    async fn run_stages(
        &self,
        request: &TranscriptionRequest,
        media_path: &mut Option<PathBuf>,
        audio_path: &mut Option<PathBuf>,
    ) -> Result<(), PipelineError> {
        let job_id = request.video_id;

        // Per-job, per-user directory: no filename namespace is ever shared
        // across jobs.
        let job_dir = self
            .config
            .work_dir
            .join(&request.user_id)
            .join(job_id.to_string());

        // Retrieval
        let stage_start = Instant::now();
        let media = self.fetcher.fetch(&request.url, &job_dir).await?;
        STAGE_DURATION
            .with_label_values(&["fetch"])
            .observe(stage_start.elapsed().as_secs_f64());
        *media_path = Some(media.path.clone());

        match self.records.set_title(job_id, &media.title) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(job_id, "job record vanished mid-run; continuing")
            }
            Err(e) => return Err(e.into()),
        }

        // Audio extraction
        let stage_start = Instant::now();
        let audio = self.extractor.extract(&media.path).await?;
        STAGE_DURATION
            .with_label_values(&["extract"])
            .observe(stage_start.elapsed().as_secs_f64());
        *audio_path = Some(audio.clone());

        // Transcription
        let stage_start = Instant::now();
        let text_path = self.transcriber.transcribe(&audio, &media.title).await?;
        STAGE_DURATION
            .with_label_values(&["transcribe"])
            .observe(stage_start.elapsed().as_secs_f64());

        // Durable storage (remote upload + local delete, or local no-op)
        let stage_start = Instant::now();
        let file_name = text_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.txt", job_id));
        let key = format!(
            "{}/{}/{}",
            ArtifactKind::Transcript.key_prefix(),
            request.user_id,
            file_name
        );
        let location = self.storage.store_file(&text_path, &key).await?;
        STAGE_DURATION
            .with_label_values(&["store"])
            .observe(stage_start.elapsed().as_secs_f64());

        // Language detection: best-effort, never fatal.
        let stage_start = Instant::now();
        let language = self.detect_language(&location).await;
        STAGE_DURATION
            .with_label_values(&["detect"])
            .observe(stage_start.elapsed().as_secs_f64());

        // Commit the transcript record, keyed by (job, language).
        let user = self.records.find_or_create_user(&request.user_id)?;
        self.records.upsert_artifact(ArtifactUpsert {
            kind: ArtifactKind::Transcript,
            job_id,
            user_id: user.id,
            language,
            location,
        })?;

        Ok(())
    }

    /// Classify the transcript's language, falling back to the configured
    /// default tag on any detector failure.
    async fn detect_language(&self, location: &str) -> String {
        let content = match self.storage.read(location).await {
            Ok(content) => content,
            Err(e) => {
                warn!(%location, error = %e, "could not read transcript for language detection");
                return self.config.default_language.clone();
            }
        };

        let sample = prepare_sample(&content);
        match self.detector.detect(&sample).await {
            Ok(language) => language,
            Err(e) => {
                warn!(
                    detector = self.detector.name(),
                    error = %e,
                    fallback = %self.config.default_language,
                    "language detection failed"
                );
                self.config.default_language.clone()
            }
        }
    }

    /// Write a terminal status, tolerating a concurrently deleted record.
    fn finish(&self, job_id: i64, status: JobStatus) {
        match self.records.set_status(job_id, status) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(job_id, "job record gone at terminal status write")
            }
            Err(e) => warn!(job_id, error = %e, "failed to write terminal status"),
        }
    }

    async fn remove_transient(&self, path: Option<&Path>) {
        let Some(path) = path else { return };
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove transient file"),
        }
    }
}
