//! Speech-to-text capability.

mod error;
mod traits;
mod whisper;

pub use error::TranscribeError;
pub use traits::{render_document, Transcriber, HEADER_WIDTH};
pub use whisper::WhisperTranscriber;
