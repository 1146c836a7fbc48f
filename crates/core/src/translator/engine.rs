//! Transcript document translation.
//!
//! Translates the natural-language payload of a transcript document while
//! preserving its structure markers verbatim: the title header block and any
//! leading `[timestamp]` token on a line pass through untouched.

use std::sync::Arc;

use tracing::warn;

use crate::storage::Storage;
use crate::transcriber::HEADER_WIDTH;

use super::chunker::split_chunks;
use super::error::TranslateError;
use super::traits::TranslationProvider;

/// Document-level translation engine.
pub struct TranscriptTranslator {
    provider: Arc<dyn TranslationProvider>,
    max_chunk_chars: usize,
}

/// Outcome of a document translation.
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    /// Storage location of the translated document.
    pub location: String,
    /// Chunks whose translation failed and passed through untranslated.
    pub fallback_chunks: usize,
}

impl TranscriptTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, max_chunk_chars: usize) -> Self {
        Self {
            provider,
            max_chunk_chars,
        }
    }

    /// Translate the document at `source_location` into `target_lang`,
    /// storing the result as a sibling named `<stem>_<lang><ext>`.
    ///
    /// Fails closed if the source cannot be read; fails open per chunk on
    /// provider errors.
    pub async fn translate_location(
        &self,
        storage: &Storage,
        source_location: &str,
        target_lang: &str,
    ) -> Result<TranslatedDocument, TranslateError> {
        let content = storage.read(source_location).await?;

        let (translated, fallback_chunks) = self.translate_document(&content, target_lang).await;

        let file_name = translated_file_name(Storage::file_name(source_location), target_lang);
        let location = storage
            .store_near(source_location, &file_name, translated.into_bytes())
            .await
            .map_err(TranslateError::Store)?;

        Ok(TranslatedDocument {
            location,
            fallback_chunks,
        })
    }

    /// Translate document text, returning the result and the number of
    /// chunks that fell back to their original text.
    pub async fn translate_document(&self, content: &str, target_lang: &str) -> (String, usize) {
        let mut output = String::with_capacity(content.len());
        let mut fallbacks = 0;

        let mut lines = content.lines().peekable();

        // Header block: title line(s) up to and including the separator pass
        // through verbatim. Documents without a separator have no header.
        if content.contains(&"=".repeat(HEADER_WIDTH)) {
            for line in lines.by_ref() {
                output.push_str(line);
                output.push('\n');
                if line.chars().all(|c| c == '=') && line.len() >= HEADER_WIDTH {
                    break;
                }
            }
        }

        while let Some(line) = lines.next() {
            if line.trim().is_empty() {
                output.push('\n');
                continue;
            }

            let (marker, payload) = split_marker(line);
            if let Some(marker) = marker {
                output.push_str(marker);
                output.push(' ');
            }

            let mut first = true;
            for chunk in split_chunks(payload, self.max_chunk_chars) {
                let translated = match self.provider.translate(&chunk, target_lang).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(provider = self.provider.name(), error = %e,
                              "chunk translation failed, keeping original text");
                        fallbacks += 1;
                        chunk
                    }
                };
                if !first {
                    output.push(' ');
                }
                output.push_str(&translated);
                first = false;
            }

            if lines.peek().is_some() {
                output.push('\n');
            }
        }

        if !output.ends_with('\n') {
            output.push('\n');
        }

        (output, fallbacks)
    }
}

/// Split a leading `[...]` structure marker off a line.
fn split_marker(line: &str) -> (Option<&str>, &str) {
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') {
        if let Some(end) = trimmed.find(']') {
            let (marker, rest) = trimmed.split_at(end + 1);
            return (Some(marker), rest.trim_start());
        }
    }
    (None, trimmed)
}

/// `talk.txt` + `it` -> `talk_it.txt`
fn translated_file_name(source_name: &str, target_lang: &str) -> String {
    match source_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, target_lang, ext),
        None => format!("{}_{}", source_name, target_lang),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that uppercases text, failing on every nth call.
    struct UppercaseProvider {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl UppercaseProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(call),
            }
        }
    }

    #[async_trait]
    impl TranslationProvider for UppercaseProvider {
        fn name(&self) -> &str {
            "uppercase"
        }

        async fn translate(&self, text: &str, _target: &str) -> Result<String, TranslateError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(TranslateError::Provider("simulated outage".to_string()));
            }
            Ok(text.to_uppercase())
        }
    }

    fn engine(provider: UppercaseProvider) -> TranscriptTranslator {
        TranscriptTranslator::new(Arc::new(provider), 4500)
    }

    #[test]
    fn test_split_marker() {
        assert_eq!(
            split_marker("[00:01] hello there"),
            (Some("[00:01]"), "hello there")
        );
        assert_eq!(split_marker("no marker here"), (None, "no marker here"));
        assert_eq!(split_marker("[unclosed rest"), (None, "[unclosed rest"));
    }

    #[test]
    fn test_translated_file_name() {
        assert_eq!(translated_file_name("talk.txt", "it"), "talk_it.txt");
        assert_eq!(translated_file_name("noext", "de"), "noext_de");
    }

    #[tokio::test]
    async fn test_header_preserved_verbatim() {
        let doc = format!("My Talk\n{}\n\nhello world\n", "=".repeat(80));
        let (out, fallbacks) = engine(UppercaseProvider::new())
            .translate_document(&doc, "it")
            .await;

        assert!(out.starts_with(&format!("My Talk\n{}\n", "=".repeat(80))));
        assert!(out.contains("HELLO WORLD"));
        assert!(!out.contains("MY TALK"));
        assert_eq!(fallbacks, 0);
    }

    #[tokio::test]
    async fn test_timestamp_markers_preserved() {
        let doc = "[00:01] first line\n[00:05] second line\n";
        let (out, _) = engine(UppercaseProvider::new())
            .translate_document(doc, "it")
            .await;

        assert!(out.contains("[00:01] FIRST LINE"));
        assert!(out.contains("[00:05] SECOND LINE"));
    }

    #[tokio::test]
    async fn test_failed_chunk_passes_through_untranslated() {
        let doc = "alpha one\nbravo two\ncharlie three\n";
        let (out, fallbacks) = engine(UppercaseProvider::failing_on(1))
            .translate_document(doc, "it")
            .await;

        assert!(out.contains("ALPHA ONE"));
        assert!(out.contains("bravo two")); // untouched fallback
        assert!(out.contains("CHARLIE THREE"));
        assert_eq!(fallbacks, 1);
    }

    #[tokio::test]
    async fn test_all_segments_present_on_partial_failure() {
        let doc = "one\ntwo\nthree\nfour\n";
        let (out, _) = engine(UppercaseProvider::failing_on(2))
            .translate_document(doc, "it")
            .await;
        let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 4);
    }
}
