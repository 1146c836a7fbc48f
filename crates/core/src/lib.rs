pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod generator;
pub mod langdetect;
pub mod metrics;
pub mod queue;
pub mod records;
pub mod storage;
pub mod testing;
pub mod transcriber;
pub mod translator;
pub mod worker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GeneratorConfig,
    LlmProvider, QueueConfig, S3Config, SanitizedConfig, StorageConfig, TranslatorConfig,
    WorkerConfig,
};
pub use extractor::{AudioExtractor, ExtractError, FfmpegExtractor};
pub use fetcher::{FetchError, FetchedMedia, MediaFetcher, YtDlpFetcher};
pub use generator::{
    create_llm_client, Flashcard, GenerateError, LlmClient, LlmError, QuizQuestion,
    StudyContentGenerator,
};
pub use langdetect::{prepare_sample, DetectError, LanguageDetector, WhatlangDetector};
pub use queue::{JobQueue, QueueError, QueueMessage, SqliteJobQueue, TranscriptionRequest};
pub use records::{
    Artifact, ArtifactKind, ArtifactUpsert, Job, JobStatus, RecordError, RecordStore,
    SqliteRecordStore, User,
};
pub use storage::{S3Client, Storage, StorageError};
pub use transcriber::{Transcriber, TranscribeError, WhisperTranscriber};
pub use translator::{
    LibreTranslateClient, TranscriptTranslator, TranslateError, TranslationProvider,
};
pub use worker::{JobPipeline, PipelineError, PollOutcome, RunOutcome, Worker};
