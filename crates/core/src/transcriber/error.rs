//! Error types for the transcriber module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during transcription.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Whisper binary not found.
    #[error("Whisper not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Input audio file not found.
    #[error("Audio file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Transcription process failed.
    #[error("Transcription failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Transcription timed out.
    #[error("Transcription timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during transcription.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscribeError {
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }
}
