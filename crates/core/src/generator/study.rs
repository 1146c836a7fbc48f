//! Study content generation over an LLM client.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::llm::{CompletionRequest, LlmClient};
use super::types::{Flashcard, GenerateError, QuizQuestion};

const FLASHCARD_SYSTEM: &str = "You are an expert educational content creator. \
You respond with a JSON array only, no prose, no code fences.";

const QUIZ_SYSTEM: &str = "You are an expert educational content creator. \
You respond with a JSON array only, no prose, no code fences.";

/// Generates flashcards and quizzes from transcript text.
pub struct StudyContentGenerator {
    llm: Arc<dyn LlmClient>,
}

impl StudyContentGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Generate 5-10 flashcards in the target language.
    pub async fn generate_flashcards(
        &self,
        transcript_text: &str,
        language: &str,
    ) -> Result<Vec<Flashcard>, GenerateError> {
        if transcript_text.trim().is_empty() {
            return Err(GenerateError::EmptySource);
        }

        let prompt = format!(
            "Create 5-10 high-quality flashcards covering the key concepts of the \
             transcript below. Write them in the language \"{language}\". Respond \
             with a JSON array of objects, each with a \"front\" (question or \
             concept) and a \"back\" (answer or explanation).\n\n\
             Transcript:\n{transcript_text}"
        );

        let request = CompletionRequest::new(prompt)
            .with_system(FLASHCARD_SYSTEM)
            .with_temperature(0.3);

        let response = self.llm.complete(request).await?;
        debug!(
            provider = self.llm.provider(),
            output_tokens = response.usage.output_tokens,
            "flashcard generation complete"
        );

        let cards: Vec<Flashcard> = parse_item_array(&response.text)?;
        for (index, card) in cards.iter().enumerate() {
            card.validate(index)?;
        }
        Ok(cards)
    }

    /// Generate 5-10 multiple-choice questions in the target language.
    pub async fn generate_quiz(
        &self,
        transcript_text: &str,
        language: &str,
    ) -> Result<Vec<QuizQuestion>, GenerateError> {
        if transcript_text.trim().is_empty() {
            return Err(GenerateError::EmptySource);
        }

        let prompt = format!(
            "Create 5-10 multiple-choice questions testing understanding of the \
             transcript below. Write them in the language \"{language}\". Make the \
             incorrect options plausible but clearly wrong to someone who \
             understood the content. Respond with a JSON array of objects, each \
             with a \"question\", an \"options\" array of exactly 4 strings, and \
             a \"correct_answer\" index between 0 and 3.\n\n\
             Transcript:\n{transcript_text}"
        );

        let request = CompletionRequest::new(prompt)
            .with_system(QUIZ_SYSTEM)
            .with_temperature(0.3);

        let response = self.llm.complete(request).await?;
        debug!(
            provider = self.llm.provider(),
            output_tokens = response.usage.output_tokens,
            "quiz generation complete"
        );

        let questions: Vec<QuizQuestion> = parse_item_array(&response.text)?;
        for (index, question) in questions.iter().enumerate() {
            question.validate(index)?;
        }
        Ok(questions)
    }
}

/// Parse a JSON array out of provider text.
///
/// Models occasionally wrap the array in prose or code fences despite the
/// system prompt; tolerate that by falling back to the outermost bracketed
/// slice. Anything that still doesn't parse is a `MalformedOutput` error.
fn parse_item_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, GenerateError> {
    let trimmed = text.trim();
    if let Ok(items) = serde_json::from_str::<Vec<T>>(trimmed) {
        return Ok(items);
    }

    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            return serde_json::from_str::<Vec<T>>(&trimmed[start..=end])
                .map_err(|e| GenerateError::MalformedOutput(e.to_string()));
        }
    }

    Err(GenerateError::MalformedOutput(format!(
        "no JSON array in provider output: {}",
        trimmed.chars().take(120).collect::<String>()
    )))
}
