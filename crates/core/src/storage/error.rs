//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur while reading, writing or deleting artifacts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The referenced location does not exist.
    #[error("Location not found: {location}")]
    NotFound { location: String },

    /// Malformed remote location string.
    #[error("Invalid remote location: {location}")]
    InvalidLocation { location: String },

    /// HTTP transport failure talking to the object store.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The object store rejected the request.
    #[error("Object store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Remote storage referenced but no remote backend configured.
    #[error("Remote location {location} but no object store configured")]
    NoRemoteBackend { location: String },

    /// Artifact content is not valid UTF-8.
    #[error("Artifact at {location} is not valid UTF-8")]
    InvalidUtf8 { location: String },

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error means the target simply was not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
