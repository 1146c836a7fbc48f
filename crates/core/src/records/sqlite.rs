//! SQLite-backed record store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::store::{ArtifactUpsert, RecordError, RecordStore};
use super::types::{Artifact, ArtifactKind, Job, JobStatus, User};

/// Title shown until retrieval reports the real one.
const PLACEHOLDER_TITLE: &str = "Processing...";

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Create a new SQLite record store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, RecordError> {
        let conn = Connection::open(path).map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite record store (useful for testing).
    pub fn in_memory() -> Result<Self, RecordError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RecordError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), RecordError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identifier TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('queued', 'processing', 'completed', 'failed')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_user_id ON jobs(user_id);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);

            CREATE TABLE IF NOT EXISTS transcripts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES jobs(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                language TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(job_id, language)
            );

            CREATE TABLE IF NOT EXISTS flashcard_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES jobs(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                language TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(job_id, language)
            );

            CREATE TABLE IF NOT EXISTS quiz_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES jobs(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                language TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(job_id, language)
            );
            "#,
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: i64 = row.get(0)?;
        let user_id: i64 = row.get(1)?;
        let url: String = row.get(2)?;
        let title: String = row.get(3)?;
        let status_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        Ok(Job {
            id,
            user_id,
            url,
            title,
            status: JobStatus::parse(&status_str).unwrap_or(JobStatus::Failed),
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    fn row_to_artifact(row: &rusqlite::Row) -> rusqlite::Result<Artifact> {
        let id: i64 = row.get(0)?;
        let job_id: i64 = row.get(1)?;
        let user_id: i64 = row.get(2)?;
        let language: String = row.get(3)?;
        let location: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        Ok(Artifact {
            id,
            job_id,
            user_id,
            language,
            location,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }
}

/// Parse timestamps - use now if parsing fails (shouldn't happen with valid data)
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl RecordStore for SqliteRecordStore {
    fn find_or_create_user(&self, identifier: &str) -> Result<User, RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        // INSERT OR IGNORE keeps this idempotent under concurrent workers.
        conn.execute(
            "INSERT OR IGNORE INTO users (identifier, created_at) VALUES (?, ?)",
            params![identifier, now.to_rfc3339()],
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        conn.query_row(
            "SELECT id, identifier, created_at FROM users WHERE identifier = ?",
            params![identifier],
            |row| {
                let id: i64 = row.get(0)?;
                let identifier: String = row.get(1)?;
                let created_at_str: String = row.get(2)?;
                Ok(User {
                    id,
                    identifier,
                    created_at: parse_timestamp(&created_at_str),
                })
            },
        )
        .map_err(|e| RecordError::Database(e.to_string()))
    }

    fn create_job(&self, user_id: i64, url: &str) -> Result<Job, RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let status = JobStatus::Queued;

        conn.execute(
            "INSERT INTO jobs (user_id, url, title, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                user_id,
                url,
                PLACEHOLDER_TITLE,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();
        Ok(Job {
            id,
            user_id,
            url: url.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_job(&self, id: i64) -> Result<Option<Job>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, url, title, status, created_at, updated_at \
             FROM jobs WHERE id = ?",
            params![id],
            Self::row_to_job,
        )
        .optional()
        .map_err(|e| RecordError::Database(e.to_string()))
    }

    fn get_job_for_user(&self, id: i64, user_id: i64) -> Result<Option<Job>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, url, title, status, created_at, updated_at \
             FROM jobs WHERE id = ? AND user_id = ?",
            params![id, user_id],
            Self::row_to_job,
        )
        .optional()
        .map_err(|e| RecordError::Database(e.to_string()))
    }

    fn list_jobs(&self, user_id: i64) -> Result<Vec<Job>, RecordError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, url, title, status, created_at, updated_at \
                 FROM jobs WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| RecordError::Database(e.to_string()))?;

        let jobs = stmt
            .query_map(params![user_id], Self::row_to_job)
            .map_err(|e| RecordError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(jobs)
    }

    fn set_status(&self, id: i64, status: JobStatus) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE jobs SET status = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), Utc::now().to_rfc3339(), id],
            )
            .map_err(|e| RecordError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(RecordError::NotFound(format!("job {}", id)));
        }
        Ok(())
    }

    fn set_title(&self, id: i64, title: &str) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE jobs SET title = ?, updated_at = ? WHERE id = ?",
                params![title, Utc::now().to_rfc3339(), id],
            )
            .map_err(|e| RecordError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(RecordError::NotFound(format!("job {}", id)));
        }
        Ok(())
    }

    fn upsert_artifact(&self, upsert: ArtifactUpsert) -> Result<Artifact, RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        // One statement per kind table; the UNIQUE(job_id, language)
        // constraint makes this an atomic check-and-set.
        let sql = format!(
            "INSERT INTO {} (job_id, user_id, language, location, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(job_id, language) DO UPDATE SET \
             location = excluded.location, updated_at = excluded.updated_at",
            upsert.kind.table()
        );
        conn.execute(
            &sql,
            params![
                upsert.job_id,
                upsert.user_id,
                upsert.language,
                upsert.location,
                now,
                now,
            ],
        )
        .map_err(|e| RecordError::Database(e.to_string()))?;

        let select = format!(
            "SELECT id, job_id, user_id, language, location, created_at, updated_at \
             FROM {} WHERE job_id = ? AND language = ?",
            upsert.kind.table()
        );
        conn.query_row(
            &select,
            params![upsert.job_id, upsert.language],
            Self::row_to_artifact,
        )
        .map_err(|e| RecordError::Database(e.to_string()))
    }

    fn find_artifact(
        &self,
        kind: ArtifactKind,
        job_id: i64,
        language: &str,
    ) -> Result<Option<Artifact>, RecordError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, job_id, user_id, language, location, created_at, updated_at \
             FROM {} WHERE job_id = ? AND language = ?",
            kind.table()
        );
        conn.query_row(&sql, params![job_id, language], Self::row_to_artifact)
            .optional()
            .map_err(|e| RecordError::Database(e.to_string()))
    }

    fn list_artifacts(&self, kind: ArtifactKind, job_id: i64) -> Result<Vec<Artifact>, RecordError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, job_id, user_id, language, location, created_at, updated_at \
             FROM {} WHERE job_id = ? ORDER BY created_at ASC, id ASC",
            kind.table()
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| RecordError::Database(e.to_string()))?;

        let artifacts = stmt
            .query_map(params![job_id], Self::row_to_artifact)
            .map_err(|e| RecordError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RecordError::Database(e.to_string()))?;

        Ok(artifacts)
    }

    fn original_transcript(&self, job_id: i64) -> Result<Option<Artifact>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, job_id, user_id, language, location, created_at, updated_at \
             FROM transcripts WHERE job_id = ? ORDER BY created_at ASC, id ASC LIMIT 1",
            params![job_id],
            Self::row_to_artifact,
        )
        .optional()
        .map_err(|e| RecordError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteRecordStore {
        SqliteRecordStore::in_memory().unwrap()
    }

    #[test]
    fn test_find_or_create_user_is_idempotent() {
        let store = store();
        let a = store.find_or_create_user("alice@example.com").unwrap();
        let b = store.find_or_create_user("alice@example.com").unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_create_job_starts_queued_with_placeholder_title() {
        let store = store();
        let user = store.find_or_create_user("u@example.com").unwrap();
        let job = store.create_job(user.id, "https://example.com/v").unwrap();

        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.title, PLACEHOLDER_TITLE);

        let fetched = store.get_job(job.id).unwrap().unwrap();
        assert_eq!(fetched, job);
    }

    #[test]
    fn test_get_job_for_user_scopes_ownership() {
        let store = store();
        let alice = store.find_or_create_user("alice@example.com").unwrap();
        let bob = store.find_or_create_user("bob@example.com").unwrap();
        let job = store.create_job(alice.id, "https://example.com/v").unwrap();

        assert!(store.get_job_for_user(job.id, alice.id).unwrap().is_some());
        assert!(store.get_job_for_user(job.id, bob.id).unwrap().is_none());
    }

    #[test]
    fn test_set_status_missing_job_is_not_found() {
        let store = store();
        let err = store.set_status(42, JobStatus::Failed).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_upsert_artifact_updates_in_place() {
        let store = store();
        let user = store.find_or_create_user("u@example.com").unwrap();
        let job = store.create_job(user.id, "https://example.com/v").unwrap();

        let first = store
            .upsert_artifact(ArtifactUpsert {
                kind: ArtifactKind::Transcript,
                job_id: job.id,
                user_id: user.id,
                language: "en".to_string(),
                location: "/tmp/a.txt".to_string(),
            })
            .unwrap();

        let second = store
            .upsert_artifact(ArtifactUpsert {
                kind: ArtifactKind::Transcript,
                job_id: job.id,
                user_id: user.id,
                language: "en".to_string(),
                location: "s3://bucket/a.txt".to_string(),
            })
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.location, "s3://bucket/a.txt");

        let all = store
            .list_artifacts(ArtifactKind::Transcript, job.id)
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_upsert_different_language_creates_new_row() {
        let store = store();
        let user = store.find_or_create_user("u@example.com").unwrap();
        let job = store.create_job(user.id, "https://example.com/v").unwrap();

        for lang in ["en", "it"] {
            store
                .upsert_artifact(ArtifactUpsert {
                    kind: ArtifactKind::Transcript,
                    job_id: job.id,
                    user_id: user.id,
                    language: lang.to_string(),
                    location: format!("/tmp/{}.txt", lang),
                })
                .unwrap();
        }

        let all = store
            .list_artifacts(ArtifactKind::Transcript, job.id)
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_original_transcript_is_oldest_row() {
        let store = store();
        let user = store.find_or_create_user("u@example.com").unwrap();
        let job = store.create_job(user.id, "https://example.com/v").unwrap();

        store
            .upsert_artifact(ArtifactUpsert {
                kind: ArtifactKind::Transcript,
                job_id: job.id,
                user_id: user.id,
                language: "en".to_string(),
                location: "/tmp/en.txt".to_string(),
            })
            .unwrap();
        store
            .upsert_artifact(ArtifactUpsert {
                kind: ArtifactKind::Transcript,
                job_id: job.id,
                user_id: user.id,
                language: "it".to_string(),
                location: "/tmp/it.txt".to_string(),
            })
            .unwrap();

        let original = store.original_transcript(job.id).unwrap().unwrap();
        assert_eq!(original.language, "en");
    }

    #[test]
    fn test_artifact_kinds_are_isolated() {
        let store = store();
        let user = store.find_or_create_user("u@example.com").unwrap();
        let job = store.create_job(user.id, "https://example.com/v").unwrap();

        store
            .upsert_artifact(ArtifactUpsert {
                kind: ArtifactKind::Flashcards,
                job_id: job.id,
                user_id: user.id,
                language: "en".to_string(),
                location: "/tmp/cards.json".to_string(),
            })
            .unwrap();

        assert!(store
            .find_artifact(ArtifactKind::Quiz, job.id, "en")
            .unwrap()
            .is_none());
        assert!(store
            .find_artifact(ArtifactKind::Flashcards, job.id, "en")
            .unwrap()
            .is_some());
    }
}
