//! LibreTranslate provider implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TranslatorConfig;

use super::error::TranslateError;
use super::traits::TranslationProvider;

/// Client for a LibreTranslate-compatible endpoint.
pub struct LibreTranslateClient {
    client: reqwest::Client,
    config: TranslatorConfig,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct TranslateErrorResponse {
    error: String,
}

impl LibreTranslateClient {
    pub fn new(config: TranslatorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_lang,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.config.url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslateError::Provider(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TranslateErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(TranslateError::Provider(format!("{}: {}", status, message)));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Provider(e.to_string()))?;

        Ok(body.translated_text)
    }
}
