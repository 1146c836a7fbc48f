//! Best-effort language identification.
//!
//! Detection is a side computation: callers convert a `DetectError` into the
//! configured default tag and move on. Nothing here is ever fatal to a job.

use async_trait::async_trait;
use thiserror::Error;

/// How much of the transcript feeds the detector.
const SAMPLE_CHARS: usize = 1000;
const SAMPLE_LINES: usize = 10;

/// Error type for language detection.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Nothing usable to classify.
    #[error("Empty sample")]
    EmptySample,

    /// The classifier produced no confident answer.
    #[error("Unable to determine language")]
    Undetermined,
}

/// Trait for language detector backends.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Returns the name of this detector implementation.
    fn name(&self) -> &str;

    /// Classify a prepared text sample to an ISO 639-1 tag.
    async fn detect(&self, sample: &str) -> Result<String, DetectError>;
}

/// Build a detection sample from transcript content: first ~1000 characters,
/// leading `[timestamp]` tokens stripped per line, at most the first 10
/// non-empty lines joined by spaces.
pub fn prepare_sample(content: &str) -> String {
    let prefix: String = content.chars().take(SAMPLE_CHARS).collect();

    prefix
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let stripped = match line.rfind(']') {
                Some(idx) if line.starts_with('[') => line[idx + 1..].trim(),
                _ => line,
            };
            if stripped.is_empty() {
                None
            } else {
                Some(stripped.to_string())
            }
        })
        .take(SAMPLE_LINES)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detector backed by the whatlang classifier.
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageDetector for WhatlangDetector {
    fn name(&self) -> &str {
        "whatlang"
    }

    async fn detect(&self, sample: &str) -> Result<String, DetectError> {
        if sample.trim().is_empty() {
            return Err(DetectError::EmptySample);
        }

        let info = whatlang::detect(sample).ok_or(DetectError::Undetermined)?;
        if !info.is_reliable() {
            return Err(DetectError::Undetermined);
        }

        Ok(iso_639_1(info.lang().code()))
    }
}

/// Map whatlang's ISO 639-3 codes to the two-letter tags the rest of the
/// system speaks. Unmapped languages keep their three-letter code.
fn iso_639_1(code: &str) -> String {
    let mapped = match code {
        "eng" => "en",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "rus" => "ru",
        "jpn" => "ja",
        "kor" => "ko",
        "cmn" => "zh",
        "ara" => "ar",
        "hin" => "hi",
        "nld" => "nl",
        "swe" => "sv",
        "dan" => "da",
        "fin" => "fi",
        "pol" => "pl",
        "tur" => "tr",
        "ukr" => "uk",
        "ces" => "cs",
        "ell" => "el",
        "heb" => "he",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        "ron" => "ro",
        "hun" => "hu",
        "bul" => "bg",
        "hrv" => "hr",
        "slk" => "sk",
        "lit" => "lt",
        "lav" => "lv",
        "est" => "et",
        "srp" => "sr",
        "kat" => "ka",
        "pes" => "fa",
        "urd" => "ur",
        "ben" => "bn",
        "tam" => "ta",
        "nob" => "no",
        other => other,
    };
    mapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_sample_strips_timestamp_markers() {
        let content = "[00:01] hello there\n[00:05] general kenobi\n";
        let sample = prepare_sample(content);
        assert_eq!(sample, "hello there general kenobi");
    }

    #[test]
    fn test_prepare_sample_limits_lines() {
        let content = (0..20)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let sample = prepare_sample(&content);
        assert!(sample.contains("line number 9"));
        assert!(!sample.contains("line number 10"));
    }

    #[test]
    fn test_prepare_sample_bounded_prefix() {
        let content = "x".repeat(5000);
        let sample = prepare_sample(&content);
        assert!(sample.chars().count() <= 1000);
    }

    #[tokio::test]
    async fn test_detect_english() {
        let detector = WhatlangDetector::new();
        let lang = detector
            .detect("The quick brown fox jumps over the lazy dog, and everyone watched it happen in the morning light.")
            .await
            .unwrap();
        assert_eq!(lang, "en");
    }

    #[tokio::test]
    async fn test_detect_empty_sample_fails() {
        let detector = WhatlangDetector::new();
        let err = detector.detect("   ").await.unwrap_err();
        assert!(matches!(err, DetectError::EmptySample));
    }

    #[test]
    fn test_iso_mapping_falls_back_to_input() {
        assert_eq!(iso_639_1("eng"), "en");
        assert_eq!(iso_639_1("epo"), "epo");
    }
}
