//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during media retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Downloader binary not found.
    #[error("yt-dlp not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The URL resolves to a playlist; only single items are processed.
    #[error("URL resolves to a playlist: {url}")]
    PlaylistNotSupported { url: String },

    /// Download process failed.
    #[error("Retrieval failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Download timed out.
    #[error("Retrieval timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to parse downloader output.
    #[error("Failed to parse downloader output: {reason}")]
    ParseError { reason: String },

    /// I/O error during retrieval.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }
}
