//! Mock transcriber for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcriber::{render_document, TranscribeError, Transcriber};

/// Mock implementation of the Transcriber trait.
///
/// Writes a real transcript document (header block plus configurable body)
/// next to the audio file.
pub struct MockTranscriber {
    body: Arc<RwLock<String>>,
    transcriptions: Arc<RwLock<Vec<PathBuf>>>,
    next_error: Arc<RwLock<Option<TranscribeError>>>,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            body: Arc::new(RwLock::new(
                "This is the spoken content of the test video, transcribed.".to_string(),
            )),
            transcriptions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the transcript body emitted for subsequent calls.
    pub async fn set_body(&self, body: impl Into<String>) {
        *self.body.write().await = body.into();
    }

    /// Audio paths transcription was attempted for.
    pub async fn recorded_transcriptions(&self) -> Vec<PathBuf> {
        self.transcriptions.read().await.clone()
    }

    /// Configure the next transcription to fail with the given error.
    pub async fn set_next_error(&self, error: TranscribeError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<TranscribeError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        title: &str,
    ) -> Result<PathBuf, TranscribeError> {
        self.transcriptions
            .write()
            .await
            .push(audio_path.to_path_buf());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let text_path = audio_path.with_extension("txt");
        let body = self.body.read().await.clone();
        tokio::fs::write(&text_path, render_document(title, &body)).await?;
        Ok(text_path)
    }
}
