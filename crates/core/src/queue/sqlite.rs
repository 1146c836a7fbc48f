//! SQLite-backed job queue with visibility-timeout semantics.
//!
//! Delivery model matches what the worker assumes of any broker:
//! at-least-once, one consumer at a time per message. A received message
//! becomes invisible for the configured timeout; if it is not deleted before
//! the timeout lapses it reappears for the next receiver with a fresh
//! receipt handle.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::{QueueError, QueueMessage, TranscriptionRequest};
use super::JobQueue;

/// Interval between visibility checks while long-polling.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// SQLite-backed queue.
pub struct SqliteJobQueue {
    conn: Mutex<Connection>,
    visibility_timeout: TimeDelta,
    wait: Duration,
}

impl SqliteJobQueue {
    /// Open (or create) the queue database at the given path.
    pub fn new(
        path: &Path,
        visibility_timeout: Duration,
        wait: Duration,
    ) -> Result<Self, QueueError> {
        let conn = Connection::open(path).map_err(|e| QueueError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            visibility_timeout: TimeDelta::from_std(visibility_timeout)
                .unwrap_or(TimeDelta::seconds(300)),
            wait,
        })
    }

    /// In-memory queue (useful for testing).
    pub fn in_memory(visibility_timeout: Duration, wait: Duration) -> Result<Self, QueueError> {
        let conn =
            Connection::open_in_memory().map_err(|e| QueueError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            visibility_timeout: TimeDelta::from_std(visibility_timeout)
                .unwrap_or(TimeDelta::seconds(300)),
            wait,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), QueueError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queue_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL,
                enqueued_at TEXT NOT NULL,
                visible_at TEXT NOT NULL,
                receipt_handle TEXT,
                receive_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_queue_visible_at ON queue_messages(visible_at);
            "#,
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;
        Ok(())
    }

    /// Try to claim the oldest visible message. Returns immediately.
    fn try_receive(&self) -> Result<Option<QueueMessage>, QueueError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let candidate: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, body FROM queue_messages WHERE visible_at <= ? \
                 ORDER BY id ASC LIMIT 1",
                params![now.to_rfc3339()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let Some((id, body)) = candidate else {
            return Ok(None);
        };

        let receipt_handle = uuid::Uuid::new_v4().to_string();
        let invisible_until = now + self.visibility_timeout;
        conn.execute(
            "UPDATE queue_messages SET visible_at = ?, receipt_handle = ?, \
             receive_count = receive_count + 1 WHERE id = ?",
            params![invisible_until.to_rfc3339(), receipt_handle, id],
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;

        Ok(Some(QueueMessage {
            receipt_handle,
            body,
        }))
    }

    /// Number of messages currently in the queue, visible or not.
    pub fn len(&self) -> Result<usize, QueueError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM queue_messages", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(|e| QueueError::Database(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn send(&self, request: &TranscriptionRequest) -> Result<(), QueueError> {
        let body = serde_json::to_string(request).map_err(|e| QueueError::Encode(e.to_string()))?;
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO queue_messages (body, enqueued_at, visible_at) VALUES (?, ?, ?)",
            params![body, now, now],
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;
        Ok(())
    }

    async fn receive(&self) -> Result<Option<QueueMessage>, QueueError> {
        let deadline = tokio::time::Instant::now() + self.wait;
        loop {
            if let Some(message) = self.try_receive()? {
                return Ok(Some(message));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        let conn = self.conn.lock().unwrap();
        // A stale handle (message already redelivered under a new one)
        // matches no row; that is a no-op, as with any at-least-once broker.
        conn.execute(
            "DELETE FROM queue_messages WHERE receipt_handle = ?",
            params![receipt_handle],
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: i64) -> TranscriptionRequest {
        TranscriptionRequest {
            video_id: id,
            url: format!("https://example.com/{}", id),
            user_id: "u@example.com".to_string(),
        }
    }

    fn queue(visibility: Duration) -> SqliteJobQueue {
        SqliteJobQueue::in_memory(visibility, Duration::from_millis(10)).unwrap()
    }

    #[tokio::test]
    async fn test_send_receive_delete() {
        let queue = queue(Duration::from_secs(60));
        queue.send(&request(1)).await.unwrap();

        let message = queue.receive().await.unwrap().unwrap();
        let parsed = TranscriptionRequest::parse(&message.body).unwrap();
        assert_eq!(parsed.video_id, 1);

        queue.delete(&message.receipt_handle).await.unwrap();
        assert!(queue.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_idle_receive_returns_none() {
        let queue = queue(Duration::from_secs(60));
        assert!(queue.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_received_message_is_invisible() {
        let queue = queue(Duration::from_secs(60));
        queue.send(&request(1)).await.unwrap();

        let first = queue.receive().await.unwrap();
        assert!(first.is_some());
        // Still in the queue, but invisible until the timeout lapses.
        assert_eq!(queue.len().unwrap(), 1);
        assert!(queue.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visibility_timeout_redelivers_with_new_handle() {
        let queue = queue(Duration::from_millis(50));
        queue.send(&request(1)).await.unwrap();

        let first = queue.receive().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        let second = queue.receive().await.unwrap().unwrap();
        assert_eq!(second.body, first.body);
        assert_ne!(second.receipt_handle, first.receipt_handle);

        // The stale handle no longer deletes anything.
        queue.delete(&first.receipt_handle).await.unwrap();
        assert_eq!(queue.len().unwrap(), 1);

        queue.delete(&second.receipt_handle).await.unwrap();
        assert!(queue.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = queue(Duration::from_secs(60));
        for id in 1..=3 {
            queue.send(&request(id)).await.unwrap();
        }

        for expected in 1..=3 {
            let message = queue.receive().await.unwrap().unwrap();
            let parsed = TranscriptionRequest::parse(&message.body).unwrap();
            assert_eq!(parsed.video_id, expected);
        }
    }
}
