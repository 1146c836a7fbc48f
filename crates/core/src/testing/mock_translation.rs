//! Mock translation provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::translator::{TranslateError, TranslationProvider};

/// Mock implementation of the TranslationProvider trait.
///
/// "Translates" by tagging the chunk with the target language, which makes
/// translated and untranslated segments trivially distinguishable in
/// assertions. Chunks containing the configured poison substring fail.
pub struct MockTranslationProvider {
    requests: Arc<RwLock<Vec<String>>>,
    fail_substring: Arc<RwLock<Option<String>>>,
}

impl Default for MockTranslationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranslationProvider {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            fail_substring: Arc::new(RwLock::new(None)),
        }
    }

    /// Fail any chunk containing this substring.
    pub async fn set_fail_substring(&self, substring: impl Into<String>) {
        *self.fail_substring.write().await = Some(substring.into());
    }

    /// Chunks submitted for translation.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl TranslationProvider for MockTranslationProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        self.requests.write().await.push(text.to_string());

        if let Some(poison) = self.fail_substring.read().await.as_ref() {
            if text.contains(poison.as_str()) {
                return Err(TranslateError::Provider("simulated outage".to_string()));
            }
        }

        Ok(format!("[{}] {}", target_lang, text))
    }
}
