//! Mock LLM client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::generator::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of the LlmClient trait.
///
/// Returns a canned response body for every completion and records the
/// prompts it was asked.
pub struct MockLlm {
    response: Arc<RwLock<String>>,
    prompts: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<LlmError>>>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            response: Arc::new(RwLock::new("[]".to_string())),
            prompts: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the text returned for subsequent completions.
    pub async fn set_response(&self, response: impl Into<String>) {
        *self.response.write().await = response.into();
    }

    /// Configure the next completion to fail with the given error.
    pub async fn set_next_error(&self, error: LlmError) {
        *self.next_error.write().await = Some(error);
    }

    /// Prompts submitted so far.
    pub async fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    pub async fn prompt_count(&self) -> usize {
        self.prompts.read().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-1"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.write().await.push(request.prompt);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(CompletionResponse {
            text: self.response.read().await.clone(),
            usage: LlmUsage::default(),
            model: "mock-1".to_string(),
        })
    }
}
