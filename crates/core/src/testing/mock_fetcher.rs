//! Mock fetcher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, FetchedMedia, MediaFetcher};

/// A recorded fetch call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub url: String,
    pub dest_dir: PathBuf,
    pub success: bool,
}

/// Mock implementation of the MediaFetcher trait.
///
/// Writes a real media file into the destination directory so downstream
/// stages (and cleanup) have something to operate on.
pub struct MockFetcher {
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    title: Arc<RwLock<String>>,
    media_content: Arc<RwLock<Vec<u8>>>,
    next_error: Arc<RwLock<Option<FetchError>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            title: Arc::new(RwLock::new("Test Video".to_string())),
            media_content: Arc::new(RwLock::new(b"fake media bytes".to_vec())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Set the title reported for subsequent fetches.
    pub async fn set_title(&self, title: impl Into<String>) {
        *self.title.write().await = title.into();
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<FetchError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia, FetchError> {
        if let Some(err) = self.take_error().await {
            self.fetches.write().await.push(RecordedFetch {
                url: url.to_string(),
                dest_dir: dest_dir.to_path_buf(),
                success: false,
            });
            return Err(err);
        }

        let title = self.title.read().await.clone();
        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(format!("{}.mp4", title));
        tokio::fs::write(&path, self.media_content.read().await.clone()).await?;

        self.fetches.write().await.push(RecordedFetch {
            url: url.to_string(),
            dest_dir: dest_dir.to_path_buf(),
            success: true,
        });

        Ok(FetchedMedia { path, title })
    }
}
