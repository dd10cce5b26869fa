//! Image-processing capability
//!
//! [`ImageHandle`] is the narrow, chainable interface the adapter drives:
//! queue up `rotate`/`resize`, read `metadata`, then materialise the result
//! with `to_buffer`. [`ImageBackend`] opens handles over raw bytes.
//!
//! [`RasterBackend`] implements both on top of the `image` crate, with EXIF
//! orientation read through `kamadak-exif`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_image::processing::{ImageBackend, ImageHandle, RasterBackend};
//!
//! # async fn example(data: Vec<u8>) -> anyhow::Result<()> {
//! let backend = RasterBackend::default();
//! let thumbnail = backend
//!     .open(data.into())
//!     .with_metadata()
//!     .rotate(None)
//!     .resize(Some(200), None)
//!     .to_buffer()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod exif;
mod raster;
mod traits;
mod types;

pub use raster::{RasterBackend, RasterHandle};
pub use traits::{ImageBackend, ImageHandle};
pub use types::{ImageMetadata, ProcessingError, ProcessingResult};
