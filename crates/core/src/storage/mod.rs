//! Uniform storage over the local filesystem and a remote object store.
//!
//! Every artifact is addressed by a single location string. A location
//! carrying the `s3://` prefix resolves to the remote backend; anything else
//! is a local filesystem path. That resolution rule lives here and nowhere
//! else — callers treat locations as opaque.

mod error;
mod s3;

pub use error::StorageError;
pub use s3::S3Client;

use std::path::{Path, PathBuf};

use tracing::debug;

/// Scheme prefix marking a remote object location.
pub const REMOTE_PREFIX: &str = "s3://";

/// Storage facade routing by location prefix.
pub struct Storage {
    /// Root directory for keyed writes when no remote backend is configured.
    local_root: PathBuf,
    s3: Option<S3Client>,
}

impl Storage {
    /// Local-only storage rooted at the given directory.
    pub fn local(local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            s3: None,
        }
    }

    /// Storage backed by a remote object store, with a local root for
    /// scratch reads/writes.
    pub fn with_s3(local_root: impl Into<PathBuf>, s3: S3Client) -> Self {
        Self {
            local_root: local_root.into(),
            s3: Some(s3),
        }
    }

    /// Whether a remote backend is configured.
    pub fn is_remote(&self) -> bool {
        self.s3.is_some()
    }

    /// Move an existing local file into durable storage under `key`.
    ///
    /// Remote backend: upload then delete the local copy, returning the
    /// `s3://` location. Local backend: a no-op — the file stays where it is
    /// and its path is the location.
    pub async fn store_file(&self, local_path: &Path, key: &str) -> Result<String, StorageError> {
        match &self.s3 {
            Some(s3) => {
                let body = tokio::fs::read(local_path).await?;
                s3.put_object(key, body).await?;
                tokio::fs::remove_file(local_path).await?;
                let location = format!("{}{}/{}", REMOTE_PREFIX, s3.bucket(), key);
                debug!(key, %location, "uploaded artifact");
                Ok(location)
            }
            None => Ok(local_path.to_string_lossy().to_string()),
        }
    }

    /// Write bytes under `key`, returning the resulting location.
    pub async fn store_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        match &self.s3 {
            Some(s3) => {
                s3.put_object(key, bytes).await?;
                Ok(format!("{}{}/{}", REMOTE_PREFIX, s3.bucket(), key))
            }
            None => {
                let path = self.local_root.join(key);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, bytes).await?;
                Ok(path.to_string_lossy().to_string())
            }
        }
    }

    /// Read a location's content as UTF-8 text.
    pub async fn read(&self, location: &str) -> Result<String, StorageError> {
        let bytes = self.read_bytes(location).await?;
        String::from_utf8(bytes).map_err(|_| StorageError::InvalidUtf8 {
            location: location.to_string(),
        })
    }

    /// Read a location's raw bytes.
    pub async fn read_bytes(&self, location: &str) -> Result<Vec<u8>, StorageError> {
        if let Some((bucket, key)) = split_remote(location)? {
            let s3 = self.s3.as_ref().ok_or_else(|| StorageError::NoRemoteBackend {
                location: location.to_string(),
            })?;
            return s3.get_object(bucket, key).await;
        }

        match tokio::fs::read(location).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                location: location.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// File name component of a location, local or remote.
    pub fn file_name(location: &str) -> &str {
        location.rsplit('/').next().unwrap_or(location)
    }

    /// Write bytes as a sibling of an existing location: same directory for
    /// local paths, same key prefix (in the configured bucket) for remote
    /// references. Keeps derived artifacts next to their source without any
    /// caller inspecting the location shape.
    pub async fn store_near(
        &self,
        location: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if let Some((_, key)) = split_remote(location)? {
            let prefix = match key.rsplit_once('/') {
                Some((dir, _)) => format!("{}/{}", dir, file_name),
                None => file_name.to_string(),
            };
            return self.store_bytes(&prefix, bytes).await;
        }

        let path = match Path::new(location).parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Delete a location. Missing targets are a no-op, not an error.
    pub async fn delete(&self, location: &str) -> Result<(), StorageError> {
        if let Some((bucket, key)) = split_remote(location)? {
            let s3 = self.s3.as_ref().ok_or_else(|| StorageError::NoRemoteBackend {
                location: location.to_string(),
            })?;
            return s3.delete_object(bucket, key).await;
        }

        match tokio::fs::remove_file(location).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Split a remote location into (bucket, key), or `None` for local paths.
fn split_remote(location: &str) -> Result<Option<(&str, &str)>, StorageError> {
    let Some(rest) = location.strip_prefix(REMOTE_PREFIX) else {
        return Ok(None);
    };
    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Some((bucket, key))),
        _ => Err(StorageError::InvalidLocation {
            location: location.to_string(),
        }),
    }
}
