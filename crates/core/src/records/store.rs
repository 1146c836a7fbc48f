//! Record storage trait and request types.

use thiserror::Error;

use super::types::{Artifact, ArtifactKind, Job, JobStatus, User};

/// Error type for record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Job or artifact missing when expected.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Natural key plus payload for an artifact upsert.
#[derive(Debug, Clone)]
pub struct ArtifactUpsert {
    pub kind: ArtifactKind,
    pub job_id: i64,
    pub user_id: i64,
    pub language: String,
    pub location: String,
}

/// Trait for record storage backends.
///
/// All writes are atomic at the statement level; a status write is visible
/// to concurrent readers before the caller proceeds.
pub trait RecordStore: Send + Sync {
    /// Find a user by identifier, creating one if absent. Idempotent.
    fn find_or_create_user(&self, identifier: &str) -> Result<User, RecordError>;

    /// Create a job in `queued` status with a placeholder title.
    fn create_job(&self, user_id: i64, url: &str) -> Result<Job, RecordError>;

    /// Get a job by id.
    fn get_job(&self, id: i64) -> Result<Option<Job>, RecordError>;

    /// Get a job by id, scoped to its owner.
    fn get_job_for_user(&self, id: i64, user_id: i64) -> Result<Option<Job>, RecordError>;

    /// List a user's jobs, newest first.
    fn list_jobs(&self, user_id: i64) -> Result<Vec<Job>, RecordError>;

    /// Atomically set a job's status. Fails with `NotFound` if the job row
    /// no longer exists.
    fn set_status(&self, id: i64, status: JobStatus) -> Result<(), RecordError>;

    /// Overwrite a job's title.
    fn set_title(&self, id: i64, title: &str) -> Result<(), RecordError>;

    /// Insert or update the artifact identified by (job, kind, language).
    /// An existing row keeps its identity; location and updated_at change.
    fn upsert_artifact(&self, upsert: ArtifactUpsert) -> Result<Artifact, RecordError>;

    /// Find one artifact by natural key.
    fn find_artifact(
        &self,
        kind: ArtifactKind,
        job_id: i64,
        language: &str,
    ) -> Result<Option<Artifact>, RecordError>;

    /// List a job's artifacts of one kind, oldest first.
    fn list_artifacts(&self, kind: ArtifactKind, job_id: i64) -> Result<Vec<Artifact>, RecordError>;

    /// The oldest transcript row for a job — the original-language
    /// source of truth for translation and generation.
    fn original_transcript(&self, job_id: i64) -> Result<Option<Artifact>, RecordError>;
}
