//! Trait definitions for the extractor module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::ExtractError;

/// An extractor that pulls the audio track out of a media file.
///
/// The output filename is derived deterministically from the input (same
/// base name, audio extension), so repeated runs for the same job overwrite
/// instead of accumulating.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Extract the audio track, returning the audio file path.
    async fn extract(&self, media_path: &Path) -> Result<PathBuf, ExtractError>;
}
