//! yt-dlp based fetcher implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::FetcherConfig;

use super::error::FetchError;
use super::traits::{FetchedMedia, MediaFetcher};

/// Fetcher shelling out to the yt-dlp binary.
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

/// The subset of the yt-dlp info dict we care about.
#[derive(Debug, Deserialize)]
struct InfoDict {
    #[serde(rename = "_type")]
    entry_type: Option<String>,
    title: Option<String>,
    #[serde(rename = "_filename")]
    filename: Option<String>,
}

impl YtDlpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    fn build_args(&self, url: &str, dest_dir: &Path) -> Vec<String> {
        vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--print-json".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
            "-o".to_string(),
            dest_dir
                .join("%(title)s.%(ext)s")
                .to_string_lossy()
                .to_string(),
            url.to_string(),
        ]
    }

    fn parse_info(url: &str, stdout: &str) -> Result<FetchedMedia, FetchError> {
        // yt-dlp prints one JSON info dict per downloaded item; with
        // --no-playlist that is exactly one line.
        let line = stdout
            .lines()
            .find(|l| l.trim_start().starts_with('{'))
            .ok_or_else(|| FetchError::ParseError {
                reason: "no JSON info dict in yt-dlp output".to_string(),
            })?;

        let info: InfoDict =
            serde_json::from_str(line).map_err(|e| FetchError::ParseError {
                reason: format!("invalid info dict: {}", e),
            })?;

        if info.entry_type.as_deref() == Some("playlist") {
            return Err(FetchError::PlaylistNotSupported {
                url: url.to_string(),
            });
        }

        let filename = info.filename.ok_or_else(|| FetchError::ParseError {
            reason: "info dict missing _filename".to_string(),
        })?;

        Ok(FetchedMedia {
            path: PathBuf::from(filename),
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        })
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<FetchedMedia, FetchError> {
        tokio::fs::create_dir_all(dest_dir).await?;

        let args = self.build_args(url, dest_dir);
        let child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::ToolNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result.map_err(FetchError::Io)?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(FetchError::failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let media = Self::parse_info(url, &stdout)?;

        // yt-dlp reports the pre-merge filename in some format combinations;
        // trust it only if the file is actually there.
        if !media.path.exists() {
            return Err(FetchError::failed(
                format!("downloaded file missing: {}", media.path.display()),
                None,
            ));
        }

        Ok(media)
    }
}
