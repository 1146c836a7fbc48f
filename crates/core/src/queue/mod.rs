//! Job queue contract and the bundled SQLite backend.

mod sqlite;
mod types;

pub use sqlite::SqliteJobQueue;
pub use types::{QueueError, QueueMessage, TranscriptionRequest};

use async_trait::async_trait;

/// Trait for queue backends.
///
/// The pipeline assumes at-least-once delivery with per-message visibility
/// timeout as the only mutual-exclusion primitive between workers. An
/// SQS-style remote broker slots in behind this trait unchanged.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job descriptor.
    async fn send(&self, request: &TranscriptionRequest) -> Result<(), QueueError>;

    /// Long-poll for one message. `None` after an idle window is a normal
    /// outcome, not an error.
    async fn receive(&self) -> Result<Option<QueueMessage>, QueueError>;

    /// Acknowledge a delivery, removing the message.
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError>;
}
