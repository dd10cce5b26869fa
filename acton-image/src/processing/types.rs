//! Core types for image processing

use image::ImageFormat;
use std::fmt;
use thiserror::Error;

/// Errors raised while processing an image
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Source bytes could not be read as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Result could not be encoded
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Source format not recognised or not supported for output
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Rotation angle is not a multiple of 90 degrees
    #[error("Unsupported rotation angle {0}, expected a multiple of 90")]
    UnsupportedAngle(i32),

    /// Requested dimensions are zero, negative or out of range
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Source image exceeds the configured size limit
    #[error("Image size {actual} exceeds limit of {limit} bytes")]
    InputTooLarge {
        /// Actual size in bytes
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// The blocking worker running the pipeline panicked or was cancelled
    #[error("Image processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for image processing
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Intrinsic properties of a source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width in pixels, before any orientation is applied
    pub width: u32,

    /// Height in pixels, before any orientation is applied
    pub height: u32,

    /// Container format detected from the content
    pub format: Option<ImageFormat>,

    /// EXIF orientation tag (1-8), if present
    pub orientation: Option<u16>,

    /// Whether the source carries an EXIF block
    pub has_exif: bool,

    /// Size of the encoded source in bytes
    pub size: usize,
}

impl ImageMetadata {
    /// MIME type of the detected format
    #[must_use]
    pub fn mime_type(&self) -> Option<&'static str> {
        self.format.map(|format| format.to_mime_type())
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(mime) = self.mime_type() {
            write!(f, " {mime}")?;
        }
        if let Some(orientation) = self.orientation {
            write!(f, " orientation={orientation}")?;
        }
        write!(f, " ({} bytes)", self.size)
    }
}
