//! Durable job and artifact records.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteRecordStore;
pub use store::{ArtifactUpsert, RecordError, RecordStore};
pub use types::{Artifact, ArtifactKind, Job, JobStatus, User};
