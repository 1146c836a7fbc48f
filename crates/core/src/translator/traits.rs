//! Trait definitions for the translator module.

use async_trait::async_trait;

use super::error::TranslateError;

/// A provider that translates one request-sized piece of text.
///
/// Callers are responsible for keeping requests under the provider's size
/// limit; see the chunker.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Translate `text` into `target_lang` (ISO 639-1).
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;
}
