//! Trait definitions for the transcriber module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::TranscribeError;

/// Width of the `=` separator line under the transcript title.
pub const HEADER_WIDTH: usize = 80;

/// Render the transcript document: title header, separator, body.
///
/// Empty speech-to-text output is legal; the document then carries only the
/// header block.
pub fn render_document(title: &str, body: &str) -> String {
    format!("{}\n{}\n\n{}\n", title, "=".repeat(HEADER_WIDTH), body.trim())
}

/// A transcriber that turns an audio file into a UTF-8 text document.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the name of this transcriber implementation.
    fn name(&self) -> &str;

    /// Transcribe `audio_path`, writing the transcript document next to the
    /// audio file. Returns the text file path.
    async fn transcribe(&self, audio_path: &Path, title: &str)
        -> Result<PathBuf, TranscribeError>;
}
