//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// A downloaded media item.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    /// Local path of the downloaded file.
    pub path: PathBuf,
    /// Human title reported by the source.
    pub title: String,
}

/// A fetcher that can retrieve media from a URL.
///
/// Implementations must be safe to call concurrently for different jobs:
/// callers pass a per-job destination directory, so filename namespaces are
/// never shared across jobs.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Download the single media item at `url` into `dest_dir`.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia, FetchError>;
}
