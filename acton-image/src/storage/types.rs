//! Core types for storage files

use super::traits::StorageFile;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Errors raised by storage file collaborators
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload is not valid base64
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Contents of a [`FileRef`]
///
/// Storage SDKs accept new files either as base64 text or as raw bytes; both
/// forms are kept as given until someone asks for the other one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePayload {
    /// Base64 text (standard alphabet, padded)
    Base64(String),
    /// Raw bytes
    Bytes(Bytes),
}

/// A new file ready to be saved by the storage service
///
/// This is what every adapter mutation returns. It also implements
/// [`StorageFile`], so a result can be fed straight back into
/// [`ImageAdapter::from_file`](crate::adapter::ImageAdapter::from_file).
///
/// # Examples
///
/// ```rust
/// use acton_image::storage::{FilePayload, FileRef};
///
/// let file = FileRef::from_base64("photo.jpg", "/9j/")
///     .with_content_type("image/jpeg");
///
/// assert_eq!(file.name(), "photo.jpg");
/// assert_eq!(file.content_type(), Some("image/jpeg"));
/// assert!(matches!(file.payload(), FilePayload::Base64(_)));
/// assert_eq!(file.to_bytes().unwrap().as_ref(), &[0xFF, 0xD8, 0xFF]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    payload: FilePayload,
    content_type: Option<String>,
}

impl FileRef {
    /// Creates a file from base64 text
    #[must_use]
    pub fn from_base64(name: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: FilePayload::Base64(base64.into()),
            content_type: None,
        }
    }

    /// Creates a file from raw bytes
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            payload: FilePayload::Bytes(data.into()),
            content_type: None,
        }
    }

    /// Attaches an explicit content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit content type, if one was attached
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Payload as given at construction
    #[must_use]
    pub const fn payload(&self) -> &FilePayload {
        &self.payload
    }

    /// Payload as base64 text
    #[must_use]
    pub fn base64(&self) -> String {
        match &self.payload {
            FilePayload::Base64(text) => text.clone(),
            FilePayload::Bytes(data) => STANDARD.encode(data),
        }
    }

    /// Payload as raw bytes
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPayload` if a base64 payload does not decode.
    pub fn to_bytes(&self) -> StorageResult<Bytes> {
        match &self.payload {
            FilePayload::Base64(text) => Ok(Bytes::from(STANDARD.decode(text)?)),
            FilePayload::Bytes(data) => Ok(data.clone()),
        }
    }
}

#[async_trait]
impl StorageFile for FileRef {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }

    async fn get_data(&self) -> StorageResult<String> {
        Ok(self.base64())
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            FilePayload::Base64(text) => {
                write!(f, "FileRef(name={}, base64_len={})", self.name, text.len())
            }
            FilePayload::Bytes(data) => {
                write!(f, "FileRef(name={}, size={})", self.name, data.len())
            }
        }
    }
}
