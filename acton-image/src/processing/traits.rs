//! Image-processing trait definitions

use super::types::{ImageMetadata, ProcessingResult};
use async_trait::async_trait;
use bytes::Bytes;

/// An in-flight image transformation pipeline
///
/// Builder methods only record work; nothing is decoded until
/// [`ImageHandle::metadata`] or [`ImageHandle::to_buffer`] is awaited.
#[async_trait]
pub trait ImageHandle: Send + Sync + Sized {
    /// Queues a rotation
    ///
    /// `Some(angle)` rotates clockwise by `angle` degrees, in queue order.
    /// `None` rotates according to the EXIF orientation tag of the source and
    /// always runs before every other queued operation, wherever it appears
    /// in the chain.
    #[must_use]
    fn rotate(self, angle: Option<i32>) -> Self;

    /// Queues a resize
    ///
    /// With both dimensions the output covers exactly `width` x `height`.
    /// With one dimension the other follows the aspect ratio. With none the
    /// image is left as is.
    #[must_use]
    fn resize(self, width: Option<u32>, height: Option<u32>) -> Self;

    /// Keeps embedded metadata in the encoded output
    #[must_use]
    fn with_metadata(self) -> Self;

    /// Reads intrinsic metadata of the source image
    ///
    /// Queued operations are not reflected in the result.
    async fn metadata(&self) -> ProcessingResult<ImageMetadata>;

    /// Runs the queued operations and encodes the result
    async fn to_buffer(self) -> ProcessingResult<Vec<u8>>;
}

/// Opens [`ImageHandle`]s over raw image bytes
pub trait ImageBackend: Send + Sync {
    /// Handle type produced by this backend
    type Handle: ImageHandle;

    /// Creates a fresh handle over `data`
    fn open(&self, data: Bytes) -> Self::Handle;

    /// Largest output, in pixels, handles from this backend will produce
    ///
    /// `None` means the backend sets no limit of its own.
    fn max_output_pixels(&self) -> Option<u64> {
        None
    }
}
