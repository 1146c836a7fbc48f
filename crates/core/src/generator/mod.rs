//! Study content generation capability.

mod llm;
mod study;
mod types;

pub use llm::{
    create_llm_client, AnthropicClient, CompletionRequest, CompletionResponse, LlmClient,
    LlmError, LlmUsage, OllamaClient,
};
pub use study::StudyContentGenerator;
pub use types::{Flashcard, GenerateError, QuizQuestion, QUIZ_OPTION_COUNT};
