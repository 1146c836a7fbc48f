//! Mock capability implementations for tests.
//!
//! These mirror the real implementations' side effects on disk (files
//! created where the contracts promise them) so pipeline tests exercise the
//! same move/cleanup paths as production.

mod mock_detector;
mod mock_extractor;
mod mock_fetcher;
mod mock_llm;
mod mock_transcriber;
mod mock_translation;

pub use mock_detector::MockDetector;
pub use mock_extractor::MockExtractor;
pub use mock_fetcher::{MockFetcher, RecordedFetch};
pub use mock_llm::MockLlm;
pub use mock_transcriber::MockTranscriber;
pub use mock_translation::MockTranslationProvider;
