//! acton-image: image helpers for files held in a storage service
//!
//! Wraps an uploaded file in an [`ImageAdapter`](adapter::ImageAdapter) that
//! hands its bytes to an image-processing pipeline and wraps the result back
//! into a new storable [`FileRef`](storage::FileRef).
//!
//! The adapter itself does no pixel work. Decoding, resampling, rotation and
//! re-encoding go through the [`ImageBackend`](processing::ImageBackend)
//! trait, implemented by default on top of the `image` crate.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_image::prelude::*;
//!
//! # async fn example(upload: FileRef) -> anyhow::Result<()> {
//! let adapter = ImageAdapter::from_file(&upload).await?;
//!
//! // Auto-orient using the EXIF orientation tag
//! let upright = adapter.rotate(None).await?;
//!
//! // Fit into 800 pixels wide, height follows the aspect ratio
//! let smaller = adapter.resize(Some(800), None).await?;
//!
//! // Half the intrinsic size
//! let half = adapter.scale(0.5, 0.5).await?;
//! # Ok(())
//! # }
//! ```

// Additional crate-specific allows:
#![allow(clippy::missing_errors_doc)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod observability;
pub mod processing;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use acton_image::prelude::*;
    //! ```

    pub use crate::adapter::ImageAdapter;
    pub use crate::config::{ImageConfig, ProcessingSettings, ResizeFilter};
    pub use crate::error::{ImageError, ImageResult};
    pub use crate::processing::{
        ImageBackend, ImageHandle, ImageMetadata, ProcessingError, ProcessingResult,
        RasterBackend, RasterHandle,
    };
    pub use crate::storage::{FilePayload, FileRef, LocalFile, StorageError, StorageFile};
}
