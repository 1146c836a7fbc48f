use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub translator: Option<TranslatorConfig>,
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            queue: QueueConfig::default(),
            worker: WorkerConfig::default(),
            fetcher: FetcherConfig::default(),
            extractor: ExtractorConfig::default(),
            transcriber: TranscriberConfig::default(),
            translator: None,
            generator: None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("lectern.db")
}

/// Storage configuration.
///
/// When `s3` is absent, artifacts stay on the local filesystem and storage
/// locations are bare paths.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub s3: Option<S3Config>,
}

/// Remote object store configuration (S3-compatible endpoint).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Endpoint override for S3-compatible stores (MinIO, Garage).
    /// Defaults to `https://s3.<region>.amazonaws.com`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,
    /// How long a received message stays invisible before redelivery.
    #[serde(default = "default_visibility_timeout")]
    pub visibility_timeout_secs: u32,
    /// Long-poll window for an idle receive.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
            visibility_timeout_secs: default_visibility_timeout(),
            wait_secs: default_wait_secs(),
        }
    }
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("lectern.db")
}

fn default_visibility_timeout() -> u32 {
    300
}

fn default_wait_secs() -> u32 {
    20
}

/// Worker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Scratch directory for media and audio transients.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Language tag used when detection fails.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Pause between polls after a queue error.
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            default_language: default_language(),
            error_backoff_secs: default_error_backoff(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("work")
}

fn default_language() -> String {
    "en".to_string()
}

fn default_error_backoff() -> u32 {
    5
}

/// Media fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,
    #[serde(default = "default_media_format")]
    pub format: String,
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            format: default_media_format(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_media_format() -> String {
    "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
}

fn default_fetch_timeout() -> u64 {
    1800
}

/// Audio extractor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Extension (and implied codec) of the extracted audio file.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
    #[serde(default = "default_extract_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_ffmpeg_log_level")]
    pub ffmpeg_log_level: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            audio_extension: default_audio_extension(),
            timeout_secs: default_extract_timeout(),
            ffmpeg_log_level: default_ffmpeg_log_level(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

fn default_extract_timeout() -> u64 {
    900
}

fn default_ffmpeg_log_level() -> String {
    "error".to_string()
}

/// Transcriber configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriberConfig {
    #[serde(default = "default_whisper_path")]
    pub whisper_path: PathBuf,
    #[serde(default = "default_whisper_model")]
    pub model: String,
    #[serde(default = "default_transcribe_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            whisper_path: default_whisper_path(),
            model: default_whisper_model(),
            timeout_secs: default_transcribe_timeout(),
        }
    }
}

fn default_whisper_path() -> PathBuf {
    PathBuf::from("whisper")
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_transcribe_timeout() -> u64 {
    3600
}

/// Translation provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslatorConfig {
    /// LibreTranslate-compatible endpoint (e.g., "http://localhost:5000").
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Upper bound on a single translation request, in characters.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_max_chunk_chars() -> usize {
    4500
}

fn default_timeout() -> u32 {
    30
}

/// Study content generator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    pub provider: LlmProvider,
    #[serde(default)]
    pub anthropic: Option<AnthropicConfig>,
    #[serde(default)]
    pub ollama: Option<OllamaConfig>,
}

/// Available LLM providers
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

/// Anthropic provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicConfig {
    pub api_key: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-5".to_string()
}

/// Ollama provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    pub model: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: SanitizedStorageConfig,
    pub queue: QueueConfig,
    pub worker: WorkerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator: Option<SanitizedTranslatorConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<SanitizedGeneratorConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranslatorConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub max_chunk_chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeneratorConfig {
    pub provider: String,
    pub model: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            storage: SanitizedStorageConfig {
                backend: if config.storage.s3.is_some() {
                    "s3".to_string()
                } else {
                    "local".to_string()
                },
                bucket: config.storage.s3.as_ref().map(|s| s.bucket.clone()),
                region: config.storage.s3.as_ref().map(|s| s.region.clone()),
            },
            queue: config.queue.clone(),
            worker: config.worker.clone(),
            translator: config
                .translator
                .as_ref()
                .map(|t| SanitizedTranslatorConfig {
                    url: t.url.clone(),
                    api_key_configured: t.api_key.is_some(),
                    max_chunk_chars: t.max_chunk_chars,
                }),
            generator: config.generator.as_ref().map(|g| SanitizedGeneratorConfig {
                provider: match g.provider {
                    LlmProvider::Anthropic => "anthropic".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                model: match g.provider {
                    LlmProvider::Anthropic => g.anthropic.as_ref().map(|a| a.model.clone()),
                    LlmProvider::Ollama => g.ollama.as_ref().map(|o| o.model.clone()),
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.queue.visibility_timeout_secs, 300);
        assert_eq!(config.worker.default_language, "en");
        assert!(config.storage.s3.is_none());
    }

    #[test]
    fn test_sanitized_config_redacts_s3_credentials() {
        let mut config = Config::default();
        config.storage.s3 = Some(S3Config {
            bucket: "artifacts".to_string(),
            region: "us-east-1".to_string(),
            access_key_id: "AKIA123".to_string(),
            secret_access_key: "very-secret".to_string(),
            endpoint: None,
            timeout_secs: 30,
        });

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
        assert!(!json.contains("AKIA123"));
        assert!(json.contains("artifacts"));
    }

    #[test]
    fn test_sanitized_generator_reports_provider() {
        let mut config = Config::default();
        config.generator = Some(GeneratorConfig {
            provider: LlmProvider::Ollama,
            anthropic: None,
            ollama: Some(OllamaConfig {
                url: default_ollama_url(),
                model: "llama3".to_string(),
            }),
        });

        let sanitized = SanitizedConfig::from(&config);
        let generator = sanitized.generator.unwrap();
        assert_eq!(generator.provider, "ollama");
        assert_eq!(generator.model.as_deref(), Some("llama3"));
    }
}
