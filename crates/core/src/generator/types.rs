//! Study content item shapes and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::llm::LlmError;

/// Number of options every quiz question must carry.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Errors that can occur during content generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Provider call failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Provider output was not parseable JSON of the expected shape.
    #[error("Malformed provider output: {0}")]
    MalformedOutput(String),

    /// A parsed item violates the expected shape.
    #[error("Invalid {kind} item at index {index}: {reason}")]
    InvalidItem {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    /// Nothing to generate from.
    #[error("Transcript text is empty")]
    EmptySource,
}

/// One flashcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    /// Question or concept on the front.
    pub front: String,
    /// Answer or explanation on the back.
    pub back: String,
}

impl Flashcard {
    /// Reject cards with an empty side.
    pub fn validate(&self, index: usize) -> Result<(), GenerateError> {
        if self.front.trim().is_empty() {
            return Err(GenerateError::InvalidItem {
                kind: "flashcard",
                index,
                reason: "empty front".to_string(),
            });
        }
        if self.back.trim().is_empty() {
            return Err(GenerateError::InvalidItem {
                kind: "flashcard",
                index,
                reason: "empty back".to_string(),
            });
        }
        Ok(())
    }
}

/// One multiple-choice quiz question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly four possible answers.
    pub options: Vec<String>,
    /// Index of the correct answer in `options`.
    pub correct_answer: usize,
}

impl QuizQuestion {
    /// Reject questions that don't conform to the four-option shape.
    pub fn validate(&self, index: usize) -> Result<(), GenerateError> {
        if self.question.trim().is_empty() {
            return Err(GenerateError::InvalidItem {
                kind: "quiz",
                index,
                reason: "empty question".to_string(),
            });
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(GenerateError::InvalidItem {
                kind: "quiz",
                index,
                reason: format!("expected {} options, got {}", QUIZ_OPTION_COUNT, self.options.len()),
            });
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(GenerateError::InvalidItem {
                kind: "quiz",
                index,
                reason: "empty option".to_string(),
            });
        }
        if self.correct_answer >= QUIZ_OPTION_COUNT {
            return Err(GenerateError::InvalidItem {
                kind: "quiz",
                index,
                reason: format!("correct_answer {} out of range", self.correct_answer),
            });
        }
        Ok(())
    }
}
