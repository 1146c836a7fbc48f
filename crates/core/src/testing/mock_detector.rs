//! Mock language detector for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::langdetect::{DetectError, LanguageDetector};

/// Mock implementation of the LanguageDetector trait.
///
/// Returns a fixed language tag, or rejects every sample when configured to
/// fail — exercising the caller-side fallback path.
pub struct MockDetector {
    language: Arc<RwLock<Option<String>>>,
    samples: Arc<RwLock<Vec<String>>>,
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDetector {
    pub fn new() -> Self {
        Self {
            language: Arc::new(RwLock::new(Some("en".to_string()))),
            samples: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Detect every sample as the given language.
    pub async fn set_language(&self, language: impl Into<String>) {
        *self.language.write().await = Some(language.into());
    }

    /// Reject every sample from now on.
    pub async fn set_failing(&self) {
        *self.language.write().await = None;
    }

    /// Samples passed to the detector.
    pub async fn recorded_samples(&self) -> Vec<String> {
        self.samples.read().await.clone()
    }
}

#[async_trait]
impl LanguageDetector for MockDetector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn detect(&self, sample: &str) -> Result<String, DetectError> {
        self.samples.write().await.push(sample.to_string());
        match self.language.read().await.clone() {
            Some(language) => Ok(language),
            None => Err(DetectError::Undetermined),
        }
    }
}
