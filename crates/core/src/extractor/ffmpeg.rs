//! FFmpeg-based audio extractor implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::ExtractorConfig;

use super::error::ExtractError;
use super::traits::AudioExtractor;

/// FFmpeg-based audio extractor.
pub struct FfmpegExtractor {
    config: ExtractorConfig,
}

impl FfmpegExtractor {
    /// Creates a new FFmpeg extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Output path: same base name as the media file, audio extension.
    fn output_path(&self, media_path: &Path) -> PathBuf {
        media_path.with_extension(&self.config.audio_extension)
    }

    fn build_args(&self, input_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn extract(&self, media_path: &Path) -> Result<PathBuf, ExtractError> {
        if !media_path.exists() {
            return Err(ExtractError::InputNotFound {
                path: media_path.to_path_buf(),
            });
        }

        let output_path = self.output_path(media_path);
        let args = self.build_args(media_path, &output_path);

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ExtractError::Io(e)
                }
            })?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result.map_err(ExtractError::Io)?,
            Err(_) => {
                return Err(ExtractError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ExtractError::failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        // Verify output exists
        if !output_path.exists() {
            return Err(ExtractError::failed(
                format!("FFmpeg produced no output: {}", output_path.display()),
                None,
            ));
        }

        Ok(output_path)
    }
}
