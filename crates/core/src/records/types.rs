//! Core record data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a job, as exposed to external readers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether this status ends a delivery attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A registered user, identified by an opaque external identifier
/// (typically an email address).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
}

/// One user-submitted URL-to-artifacts processing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    /// Placeholder until retrieval reports the real title.
    pub title: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The kinds of derived artifacts a job can own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Transcript,
    Flashcards,
    Quiz,
}

impl ArtifactKind {
    /// Backing table for this kind.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcripts",
            ArtifactKind::Flashcards => "flashcard_sets",
            ArtifactKind::Quiz => "quiz_sets",
        }
    }

    /// Storage key prefix for persisted content of this kind.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcripts",
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::Quiz => "quizzes",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcript",
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::Quiz => "quiz",
        }
    }
}

/// A language-tagged pointer to stored derived content.
///
/// At most one artifact per (job, kind, language) is authoritative;
/// re-derivation updates the row in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    /// ISO 639-1 tag.
    pub language: String,
    /// Opaque storage location — local path or remote object reference.
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            JobStatus::Queued,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("retrying"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }

    #[test]
    fn test_status_serde_as_snake_case_string() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
