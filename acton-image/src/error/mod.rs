//! Error types and error handling

use thiserror::Error;

use crate::processing::ProcessingError;
use crate::storage::StorageError;

/// Adapter error type
///
/// [`ImageError::IncorrectType`] and [`ImageError::UnknownType`] are the only
/// failures raised by the adapter itself. Every other variant carries the
/// collaborator's error as-is.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The resolved content type is not an `image/*` type
    #[error("{message}")]
    IncorrectType {
        /// File that was rejected
        filename: String,
        /// Human readable explanation naming the file
        message: String,
    },

    /// No content type was supplied and none could be derived from the filename
    #[error("Cannot determine the content type of {filename}")]
    UnknownType {
        /// File that was rejected
        filename: String,
    },

    /// Failure from the storage file collaborator
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The storage payload was not valid base64
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Failure from the image-processing collaborator
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl ImageError {
    /// Builds an [`ImageError::IncorrectType`] for `filename`
    #[must_use]
    pub fn incorrect_type(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let message = format!("{filename} is not an image and cannot be processed");
        Self::IncorrectType { filename, message }
    }

    /// Returns `true` for content-type rejections
    #[must_use]
    pub const fn is_incorrect_type(&self) -> bool {
        matches!(self, Self::IncorrectType { .. })
    }
}

/// Result type for adapter operations
pub type ImageResult<T> = Result<T, ImageError>;
