//! Transcript translation capability.

mod chunker;
mod engine;
mod error;
mod libre;
mod traits;

pub use chunker::split_chunks;
pub use engine::{TranscriptTranslator, TranslatedDocument};
pub use error::TranslateError;
pub use libre::LibreTranslateClient;
pub use traits::TranslationProvider;
