//! Whisper CLI based transcriber implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::TranscriberConfig;

use super::error::TranscribeError;
use super::traits::{render_document, Transcriber};

/// Transcriber shelling out to the OpenAI Whisper CLI.
pub struct WhisperTranscriber {
    config: TranscriberConfig,
}

impl WhisperTranscriber {
    /// Creates a new transcriber with the given configuration.
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Creates a transcriber with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscriberConfig::default())
    }

    fn build_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--output_format".to_string(),
            "txt".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(
        &self,
        audio_path: &Path,
        title: &str,
    ) -> Result<PathBuf, TranscribeError> {
        if !audio_path.exists() {
            return Err(TranscribeError::InputNotFound {
                path: audio_path.to_path_buf(),
            });
        }

        let output_dir = audio_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let args = self.build_args(audio_path, &output_dir);
        let child = Command::new(&self.config.whisper_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscribeError::ToolNotFound {
                        path: self.config.whisper_path.clone(),
                    }
                } else {
                    TranscribeError::Io(e)
                }
            })?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result.map_err(TranscribeError::Io)?,
            Err(_) => {
                return Err(TranscribeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(TranscribeError::failed(
                format!("whisper exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        // Whisper writes <audio stem>.txt into the output dir. An empty
        // transcription is legal (silent audio), so a missing or empty file
        // degrades to an empty body rather than an error.
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        let text_path = output_dir.join(stem).with_extension("txt");
        let body = tokio::fs::read_to_string(&text_path)
            .await
            .unwrap_or_default();

        // Rewrite in place with the title header; re-runs overwrite, so the
        // header never doubles up.
        tokio::fs::write(&text_path, render_document(title, &body)).await?;

        Ok(text_path)
    }
}
