//! Store error handling

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by `Store` operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// An entry with the same word and language is already stored
    #[error("Entry already exists: '{english_word}' ({learning_language})")]
    AlreadyExists {
        english_word: String,
        learning_language: String,
    },

    /// Import content is not a JSON list of entries
    #[error("Import failed: {origin} is not a valid word list: {details}")]
    InvalidImport { origin: String, details: String },

    /// Import file could not be read
    #[error("Import failed: could not read '{path}': {source}")]
    ImportRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entries could not be encoded
    #[error("Failed to encode word list: {0}")]
    Encode(#[from] serde_json::Error),

    /// Backend failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Suggestion printed under the error message
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::AlreadyExists { .. } => {
                Some("Use `vocab edit` to change the existing entry instead.")
            }
            StoreError::InvalidImport { .. } => {
                Some("Import files must contain a JSON array, as written by `vocab export`.")
            }
            StoreError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_display() {
        let err = StoreError::AlreadyExists {
            english_word: "dog".to_string(),
            learning_language: "Spanish".to_string(),
        };
        assert_eq!(err.to_string(), "Entry already exists: 'dog' (Spanish)");
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_storage_suggestion_passes_through() {
        let err = StoreError::from(StorageError::DiskFull {
            path: PathBuf::from("/full"),
            source: io::Error::new(io::ErrorKind::Other, "No space left on device"),
        });
        assert_eq!(
            err.recovery_suggestion(),
            Some("Free up disk space and try again.")
        );
    }
}
