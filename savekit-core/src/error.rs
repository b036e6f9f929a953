//! Error types for save/load operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for save/load operations.
pub type SaveLoadResult<T> = Result<T, SaveLoadError>;

/// Errors raised by the save/load pipeline.
///
/// A missing save file is not an error for `load`, `load_overwrite` or
/// `delete_save`; those report absence through their return value instead.
#[derive(Debug, Error)]
pub enum SaveLoadError {
    /// The manager configuration is invalid, or a custom strategy is missing
    /// or bound twice.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The filename cannot be mapped onto a single file in the save directory.
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// A filesystem operation failed.
    #[error("file system error during {context}: {source}")]
    FileSystem {
        /// Context describing the operation.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file does not exist.
    #[error("save file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The bytes could not be decoded into the requested shape.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Encryption failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key, tampered or truncated ciphertext).
    #[error("decryption error: {0}")]
    Decryption(String),

    /// The lock guarding a managed object was poisoned.
    #[error("managed object lock poisoned: {0}")]
    Poisoned(String),
}

impl SaveLoadError {
    /// Wraps an I/O error with a description of the failed operation.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileSystem {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` for the file-not-found outcome of a read.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
