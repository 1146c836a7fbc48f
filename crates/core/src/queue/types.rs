//! Queue message types and contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Backing store failure.
    #[error("Queue database error: {0}")]
    Database(String),

    /// Message body could not be serialized.
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

/// Wire contract for a transcription job message.
///
/// Flat JSON object; `video_id` and `url` are mandatory — a body missing
/// either is rejected at parse time and left for the queue's redelivery
/// policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionRequest {
    pub video_id: i64,
    pub url: String,
    pub user_id: String,
}

impl TranscriptionRequest {
    /// Parse a raw message body. Any shape mismatch is an error.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// One delivery of a queue message.
///
/// The receipt handle identifies this delivery, not the message: redelivery
/// after a visibility timeout issues a fresh handle and invalidates the old
/// one.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub receipt_handle: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_body() {
        let request =
            TranscriptionRequest::parse(r#"{"video_id": 7, "url": "https://x", "user_id": "u"}"#)
                .unwrap();
        assert_eq!(request.video_id, 7);
        assert_eq!(request.url, "https://x");
    }

    #[test]
    fn test_parse_rejects_missing_video_id() {
        assert!(TranscriptionRequest::parse(r#"{"url": "https://x", "user_id": "u"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_url() {
        assert!(TranscriptionRequest::parse(r#"{"video_id": 7, "user_id": "u"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(TranscriptionRequest::parse("not json").is_err());
    }
}
