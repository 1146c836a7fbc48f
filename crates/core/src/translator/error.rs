//! Error types for the translator module.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during translation.
///
/// Provider errors are chunk-level and handled inside the document engine
/// (the untranslated chunk passes through); they only escape when a caller
/// translates a bare string directly. Source errors are document-level and
/// always fatal.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The source document could not be read at all.
    #[error("Failed to read source transcript: {0}")]
    Source(#[from] StorageError),

    /// The translation provider rejected or failed a request.
    #[error("Translation provider error: {0}")]
    Provider(String),

    /// Failed to persist the translated document.
    #[error("Failed to store translation: {0}")]
    Store(StorageError),
}
