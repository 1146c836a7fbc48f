//! Mock audio extractor for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::extractor::{AudioExtractor, ExtractError};

/// Mock implementation of the AudioExtractor trait.
///
/// Produces a real audio file next to the media file, mirroring the
/// deterministic-filename contract of the ffmpeg implementation.
pub struct MockExtractor {
    extractions: Arc<RwLock<Vec<PathBuf>>>,
    next_error: Arc<RwLock<Option<ExtractError>>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            extractions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Media paths extraction was attempted for.
    pub async fn recorded_extractions(&self) -> Vec<PathBuf> {
        self.extractions.read().await.clone()
    }

    /// Configure the next extraction to fail with the given error.
    pub async fn set_next_error(&self, error: ExtractError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<ExtractError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl AudioExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, media_path: &Path) -> Result<PathBuf, ExtractError> {
        self.extractions
            .write()
            .await
            .push(media_path.to_path_buf());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let audio_path = media_path.with_extension("mp3");
        tokio::fs::write(&audio_path, b"fake audio bytes").await?;
        Ok(audio_path)
    }
}
