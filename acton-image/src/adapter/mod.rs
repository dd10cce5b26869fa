//! Image adapter for storage files
//!
//! [`ImageAdapter`] holds the bytes of one uploaded image and turns the
//! results of delegated image operations back into storable [`FileRef`]s
//! under the original filename.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_image::prelude::*;
//!
//! # async fn example(upload: FileRef) -> anyhow::Result<()> {
//! let adapter = ImageAdapter::from_file(&upload).await?;
//!
//! // Any chain the handle supports
//! let thumbnail = adapter
//!     .edit(|handle| handle.rotate(None).resize(Some(200), Some(200)).to_buffer())
//!     .await?;
//!
//! assert_eq!(thumbnail.name(), upload.name());
//! # Ok(())
//! # }
//! ```

use crate::error::{ImageError, ImageResult};
use crate::processing::{
    ImageBackend, ImageHandle, ProcessingError, ProcessingResult, RasterBackend,
};
use crate::storage::{FileRef, StorageFile};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use std::future::Future;
use tracing::{debug, info, instrument};

const IMAGE_PREFIX: &str = "image/";

/// An uploaded image ready for processing
///
/// Construction checks that the content type is an `image/*` type; after
/// that the adapter never changes. Every operation works on a fresh handle
/// over the stored bytes.
#[derive(Debug, Clone)]
pub struct ImageAdapter<B: ImageBackend = RasterBackend> {
    filename: String,
    data: Bytes,
    content_type: String,
    backend: B,
}

impl ImageAdapter {
    /// Loads an adapter from a storage file
    ///
    /// Fetches the base64 payload and decodes it. The content type recorded
    /// by the storage file wins; without one it is inferred from the name.
    ///
    /// # Errors
    ///
    /// Returns the storage error unchanged if the payload cannot be fetched,
    /// `ImageError::Base64` if it does not decode, and the construction
    /// errors of [`ImageAdapter::new`].
    #[instrument(skip_all, fields(filename = %source.name()))]
    pub async fn from_file<F>(source: &F) -> ImageResult<Self>
    where
        F: StorageFile + ?Sized,
    {
        let payload = source.get_data().await?;
        let data = STANDARD.decode(payload)?;
        debug!(bytes = data.len(), "fetched source file");
        let content_type = source.content_type();
        Self::new(source.name(), data, content_type.as_deref())
    }

    /// Creates an adapter over raw bytes
    ///
    /// Without an explicit `content_type` the type is looked up from the
    /// filename extension.
    ///
    /// # Errors
    ///
    /// - `ImageError::IncorrectType` if the content type is not `image/*`
    /// - `ImageError::UnknownType` if no content type is given and none can
    ///   be derived from the filename
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_image::adapter::ImageAdapter;
    ///
    /// let adapter = ImageAdapter::new("photo.jpg", vec![0xFF, 0xD8, 0xFF], None).unwrap();
    /// assert_eq!(adapter.content_type(), "image/jpeg");
    ///
    /// let err = ImageAdapter::new("notes.txt", b"hello".to_vec(), None).unwrap_err();
    /// assert!(err.is_incorrect_type());
    /// ```
    pub fn new(
        filename: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> ImageResult<Self> {
        let filename = filename.into();
        let content_type = resolve_content_type(&filename, content_type)?;
        Ok(Self {
            filename,
            data: data.into(),
            content_type,
            backend: RasterBackend::default(),
        })
    }
}

impl<B: ImageBackend> ImageAdapter<B> {
    /// Swaps the image-processing backend
    #[must_use]
    pub fn with_backend<C: ImageBackend>(self, backend: C) -> ImageAdapter<C> {
        ImageAdapter {
            filename: self.filename,
            data: self.data,
            content_type: self.content_type,
            backend,
        }
    }

    /// Original filename
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolved content type, always `image/*`
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Stored source bytes
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Opens a fresh handle over the stored bytes, keeping metadata
    #[must_use]
    pub fn pipeline(&self) -> B::Handle {
        self.backend.open(self.data.clone()).with_metadata()
    }

    /// Runs `transform` once on a fresh handle and returns its result as is
    ///
    /// The transform may return anything: a further configured handle, a
    /// future of encoded bytes, or a plain value.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use acton_image::prelude::*;
    ///
    /// # async fn example(adapter: ImageAdapter) -> anyhow::Result<()> {
    /// // Continue the chain later
    /// let handle = adapter.process(|handle| handle.rotate(Some(90)));
    ///
    /// // Or materialise right away
    /// let bytes = adapter.process(|handle| handle.resize(Some(64), None).to_buffer()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn process<T, F>(&self, transform: F) -> T
    where
        F: FnOnce(B::Handle) -> T,
    {
        transform(self.pipeline())
    }

    /// Runs an async `transform` producing encoded bytes
    pub async fn process_to_buffer<F, Fut>(&self, transform: F) -> ImageResult<Vec<u8>>
    where
        F: FnOnce(B::Handle) -> Fut,
        Fut: Future<Output = ProcessingResult<Vec<u8>>>,
    {
        Ok(self.process(transform).await?)
    }

    /// Runs `transform` and wraps its bytes into a new file
    ///
    /// The new file keeps the original filename and carries a base64 payload.
    #[instrument(skip_all, fields(filename = %self.filename))]
    pub async fn edit<F, Fut>(&self, transform: F) -> ImageResult<FileRef>
    where
        F: FnOnce(B::Handle) -> Fut,
        Fut: Future<Output = ProcessingResult<Vec<u8>>>,
    {
        let buffer = self.process_to_buffer(transform).await?;
        info!(bytes = buffer.len(), "produced edited file");
        Ok(self.wrap(&buffer))
    }

    /// Rotates the image
    ///
    /// `Some(angle)` rotates clockwise by `angle` degrees; `None` turns the
    /// image upright according to its EXIF orientation.
    #[instrument(skip(self), fields(filename = %self.filename))]
    pub async fn rotate(&self, angle: Option<i32>) -> ImageResult<FileRef> {
        self.edit(|handle| handle.rotate(angle).to_buffer()).await
    }

    /// Resizes the image
    ///
    /// With both dimensions the result covers exactly `width` x `height`;
    /// with one, the other follows the aspect ratio.
    #[instrument(skip(self), fields(filename = %self.filename))]
    pub async fn resize(&self, width: Option<u32>, height: Option<u32>) -> ImageResult<FileRef> {
        self.edit(|handle| handle.resize(width, height).to_buffer()).await
    }

    /// Scales the image by factors of its intrinsic size
    ///
    /// The target is `round(width * width_factor)` x
    /// `round(height * height_factor)`.
    ///
    /// # Errors
    ///
    /// `ProcessingError::InvalidDimensions` if a factor is negative or not
    /// finite, a target dimension rounds to zero, or the target exceeds the
    /// backend's output pixel limit. Nothing is decoded in those cases.
    #[instrument(skip(self), fields(filename = %self.filename))]
    pub async fn scale(&self, width_factor: f64, height_factor: f64) -> ImageResult<FileRef> {
        let limit = self.backend.max_output_pixels();
        self.edit(|handle| async move {
            let metadata = handle.metadata().await?;
            let (width, height) = scaled_dimensions(
                (metadata.width, metadata.height),
                (width_factor, height_factor),
                limit,
            )?;
            debug!(
                from_width = metadata.width,
                from_height = metadata.height,
                width,
                height,
                "scaling"
            );
            handle.resize(Some(width), Some(height)).to_buffer().await
        })
        .await
    }

    /// Scales by the default factors `(1, 1)`
    pub async fn scale_default(&self) -> ImageResult<FileRef> {
        self.scale(1.0, 1.0).await
    }

    fn wrap(&self, buffer: &[u8]) -> FileRef {
        FileRef::from_base64(self.filename.clone(), STANDARD.encode(buffer))
            .with_content_type(self.content_type.clone())
    }
}

fn resolve_content_type(filename: &str, explicit: Option<&str>) -> ImageResult<String> {
    let content_type = match explicit {
        Some(content_type) => content_type.to_string(),
        None => mime_guess::from_path(filename)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .ok_or_else(|| ImageError::UnknownType {
                filename: filename.to_string(),
            })?,
    };

    if !content_type.starts_with(IMAGE_PREFIX) {
        return Err(ImageError::incorrect_type(filename));
    }
    Ok(content_type)
}

/// Target pixel dimensions for a scale operation
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_dimensions(
    (width, height): (u32, u32),
    (width_factor, height_factor): (f64, f64),
    max_pixels: Option<u64>,
) -> ProcessingResult<(u32, u32)> {
    let scale = |size: u32, factor: f64| -> ProcessingResult<u32> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ProcessingError::InvalidDimensions(format!(
                "scale factor {factor} must be a finite, non-negative number"
            )));
        }
        let target = (f64::from(size) * factor).round();
        if target < 1.0 || target > f64::from(u32::MAX) {
            return Err(ProcessingError::InvalidDimensions(format!(
                "scaling {size} by {factor} gives {target} pixels"
            )));
        }
        Ok(target as u32)
    };

    let target = (scale(width, width_factor)?, scale(height, height_factor)?);
    if let Some(limit) = max_pixels {
        if u64::from(target.0) * u64::from(target.1) > limit {
            return Err(ProcessingError::InvalidDimensions(format!(
                "{}x{} exceeds the limit of {limit} pixels",
                target.0, target.1
            )));
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ImageMetadata;
    use crate::storage::{MockStorageFile, StorageError};
    use crate::testing::{create_test_png, dimensions, Call, RecordingBackend};
    use proptest::prelude::*;

    fn adapter(backend: RecordingBackend) -> ImageAdapter<RecordingBackend> {
        ImageAdapter::new("photo.png", vec![1, 2, 3], None)
            .unwrap()
            .with_backend(backend)
    }

    #[test]
    fn test_content_type_from_extension() {
        let adapter = ImageAdapter::new("photo.JPG", vec![1], None).unwrap();
        assert_eq!(adapter.content_type(), "image/jpeg");
        assert_eq!(adapter.filename(), "photo.JPG");
        assert_eq!(adapter.data().as_ref(), &[1]);
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let adapter = ImageAdapter::new("upload.bin", vec![1], Some("image/webp")).unwrap();
        assert_eq!(adapter.content_type(), "image/webp");

        let err = ImageAdapter::new("photo.png", vec![1], Some("text/plain")).unwrap_err();
        assert!(err.is_incorrect_type());
    }

    #[test]
    fn test_non_image_rejected() {
        let err = ImageAdapter::new("report.pdf", vec![1], None).unwrap_err();
        match err {
            ImageError::IncorrectType { filename, message } => {
                assert_eq!(filename, "report.pdf");
                assert!(message.contains("report.pdf"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extension() {
        let err = ImageAdapter::new("README", vec![1], None).unwrap_err();
        assert!(matches!(err, ImageError::UnknownType { filename } if filename == "README"));
    }

    #[tokio::test]
    async fn test_from_file_decodes_payload() {
        let mut source = MockStorageFile::new();
        source.expect_name().return_const("avatar.gif".to_string());
        source.expect_content_type().return_const(None::<String>);
        source
            .expect_get_data()
            .times(1)
            .returning(|| Ok("AQID".to_string()));

        let adapter = ImageAdapter::from_file(&source).await.unwrap();
        assert_eq!(adapter.filename(), "avatar.gif");
        assert_eq!(adapter.content_type(), "image/gif");
        assert_eq!(adapter.data().as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_from_file_propagates_storage_error() {
        let mut source = MockStorageFile::new();
        source.expect_name().return_const("avatar.gif".to_string());
        source
            .expect_get_data()
            .returning(|| Err(StorageError::NotFound("avatar.gif".to_string())));

        let err = ImageAdapter::from_file(&source).await.unwrap_err();
        assert!(matches!(err, ImageError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_from_file_invalid_base64() {
        let source = FileRef::from_base64("avatar.png", "%%%");
        let err = ImageAdapter::from_file(&source).await.unwrap_err();
        assert!(matches!(err, ImageError::Base64(_)));
    }

    #[tokio::test]
    async fn test_from_file_rejects_non_image_name() {
        let source = FileRef::from_bytes("data.json", b"{}".to_vec());
        let err = ImageAdapter::from_file(&source).await.unwrap_err();
        assert!(err.is_incorrect_type());
    }

    #[test]
    fn test_process_passes_fresh_handle_once() {
        let backend = RecordingBackend::new(10, 10, vec![]);
        let adapter = adapter(backend.clone());

        let mut invocations = 0;
        let value = adapter.process(|_handle| {
            invocations += 1;
            42
        });

        assert_eq!(value, 42);
        assert_eq!(invocations, 1);
        assert_eq!(
            backend.calls(),
            vec![Call::Open(Bytes::from_static(&[1, 2, 3])), Call::WithMetadata]
        );
    }

    #[test]
    fn test_process_can_return_handle() {
        let backend = RecordingBackend::new(10, 10, vec![]);
        let adapter = adapter(backend.clone());

        let handle = adapter.process(|handle| handle.rotate(Some(90)));
        let _handle = handle.resize(Some(5), None);

        assert_eq!(backend.opens(), 1);
        assert_eq!(backend.calls().last(), Some(&Call::Resize(Some(5), None)));
    }

    #[tokio::test]
    async fn test_edit_wraps_transform_output() {
        let backend = RecordingBackend::new(10, 10, vec![]);
        let adapter = adapter(backend);

        let file = adapter
            .edit(|_handle| async { Ok(vec![9, 8, 7]) })
            .await
            .unwrap();

        assert_eq!(file.name(), "photo.png");
        assert_eq!(file.content_type(), Some("image/png"));
        assert_eq!(file.base64(), "CQgH");
        assert_eq!(file.to_bytes().unwrap().as_ref(), &[9, 8, 7]);
    }

    #[tokio::test]
    async fn test_edit_propagates_transform_error() {
        let adapter = adapter(RecordingBackend::new(10, 10, vec![]));

        let err = adapter
            .edit(|_handle| async { Err(ProcessingError::Decode("broken".to_string())) })
            .await
            .unwrap_err();

        assert!(matches!(err, ImageError::Processing(ProcessingError::Decode(_))));
    }

    #[tokio::test]
    async fn test_rotate_delegates() {
        let backend = RecordingBackend::new(10, 10, vec![4, 5]);
        let file = adapter(backend.clone()).rotate(None).await.unwrap();

        assert_eq!(file.name(), "photo.png");
        assert_eq!(file.to_bytes().unwrap().as_ref(), &[4, 5]);
        assert!(backend.calls().contains(&Call::Rotate(None)));
        assert_eq!(backend.calls().last(), Some(&Call::ToBuffer));
    }

    #[tokio::test]
    async fn test_resize_delegates() {
        let backend = RecordingBackend::new(10, 10, vec![6]);
        let file = adapter(backend.clone()).resize(Some(300), None).await.unwrap();

        assert_eq!(file.to_bytes().unwrap().as_ref(), &[6]);
        assert!(backend.calls().contains(&Call::Resize(Some(300), None)));
    }

    #[tokio::test]
    async fn test_scale_requests_rounded_dimensions() {
        let backend = RecordingBackend::new(100, 50, vec![1]);
        adapter(backend.clone()).scale(2.0, 1.0).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                Call::Open(Bytes::from_static(&[1, 2, 3])),
                Call::WithMetadata,
                Call::Metadata,
                Call::Resize(Some(200), Some(50)),
                Call::ToBuffer,
            ]
        );
    }

    #[tokio::test]
    async fn test_scale_default_keeps_dimensions() {
        let backend = RecordingBackend::new(123, 45, vec![1]);
        adapter(backend.clone()).scale_default().await.unwrap();

        assert!(backend.calls().contains(&Call::Resize(Some(123), Some(45))));
    }

    #[tokio::test]
    async fn test_scale_to_zero_fails() {
        let backend = RecordingBackend::new(10, 10, vec![1]);
        let err = adapter(backend.clone()).scale(0.01, 1.0).await.unwrap_err();

        assert!(matches!(
            err,
            ImageError::Processing(ProcessingError::InvalidDimensions(_))
        ));
        assert!(!backend.calls().contains(&Call::ToBuffer));
    }

    #[tokio::test]
    async fn test_scale_beyond_pixel_limit_fails_before_resizing() {
        let backend = RecordingBackend::new(10, 10, vec![1]).with_max_output_pixels(10_000);
        let err = adapter(backend.clone()).scale(10.0, 10.1).await.unwrap_err();

        assert!(matches!(
            err,
            ImageError::Processing(ProcessingError::InvalidDimensions(_))
        ));
        assert!(!backend.calls().iter().any(|call| matches!(call, Call::Resize(..))));
        assert!(!backend.calls().contains(&Call::ToBuffer));
    }

    #[tokio::test]
    async fn test_huge_scale_on_raster_backend_is_an_error() {
        let adapter = ImageAdapter::new("tile.png", create_test_png(10, 10), None).unwrap();

        let err = adapter.scale(4.0e8, 4.0e8).await.unwrap_err();
        assert!(matches!(
            err,
            ImageError::Processing(ProcessingError::InvalidDimensions(_))
        ));

        let err = adapter.resize(Some(u32::MAX), Some(u32::MAX)).await.unwrap_err();
        assert!(matches!(
            err,
            ImageError::Processing(ProcessingError::InvalidDimensions(_))
        ));
    }

    #[tokio::test]
    async fn test_from_file_prefers_recorded_content_type() {
        let source = FileRef::from_bytes("upload.bin", vec![1, 2]).with_content_type("image/webp");
        let adapter = ImageAdapter::from_file(&source).await.unwrap();
        assert_eq!(adapter.content_type(), "image/webp");

        let source = FileRef::from_bytes("photo.png", vec![1]).with_content_type("text/plain");
        let err = ImageAdapter::from_file(&source).await.unwrap_err();
        assert!(err.is_incorrect_type());
    }

    #[test]
    fn test_scaled_dimensions() {
        let scale = |size, factors| scaled_dimensions(size, factors, None);
        assert_eq!(scale((100, 50), (2.0, 1.0)).unwrap(), (200, 50));
        assert_eq!(scale((101, 51), (0.5, 0.5)).unwrap(), (51, 26));
        assert!(scale((10, 10), (f64::NAN, 1.0)).is_err());
        assert!(scale((10, 10), (1.0, -2.0)).is_err());
        assert!(scale((10, 10), (f64::INFINITY, 1.0)).is_err());
        assert!(scale((10, 10), (5.0e8, 1.0)).is_err());
    }

    #[test]
    fn test_scaled_dimensions_pixel_limit() {
        assert_eq!(
            scaled_dimensions((10, 10), (10.0, 10.0), Some(10_000)).unwrap(),
            (100, 100)
        );
        assert!(scaled_dimensions((10, 10), (10.0, 10.1), Some(10_000)).is_err());
        assert!(scaled_dimensions((10, 10), (1.0e5, 1.0e5), Some(u64::MAX)).is_ok());
    }

    #[tokio::test]
    async fn test_raster_end_to_end() {
        let source = FileRef::from_bytes("chart.png", create_test_png(40, 20));
        let adapter = ImageAdapter::from_file(&source).await.unwrap();

        let rotated = adapter.rotate(Some(90)).await.unwrap();
        assert_eq!(dimensions(&rotated.to_bytes().unwrap()), (20, 40));

        let resized = adapter.resize(None, Some(10)).await.unwrap();
        assert_eq!(dimensions(&resized.to_bytes().unwrap()), (20, 10));

        let scaled = adapter.scale(0.5, 1.5).await.unwrap();
        assert_eq!(dimensions(&scaled.to_bytes().unwrap()), (20, 30));
        assert_eq!(scaled.name(), "chart.png");

        // Results can be loaded again
        let again = ImageAdapter::from_file(&scaled).await.unwrap();
        let metadata: ImageMetadata = again.pipeline().metadata().await.unwrap();
        assert_eq!((metadata.width, metadata.height), (20, 30));
    }

    proptest! {
        #[test]
        fn prop_non_image_extensions_rejected(
            stem in "[a-z]{1,12}",
            ext in prop::sample::select(vec!["txt", "pdf", "json", "html", "zip", "mp4"]),
        ) {
            let filename = format!("{stem}.{ext}");
            let err = ImageAdapter::new(filename.clone(), vec![0u8], None).unwrap_err();
            prop_assert!(err.is_incorrect_type());
            prop_assert!(err.to_string().contains(&filename));
        }

        #[test]
        fn prop_image_extensions_accepted(
            stem in "[a-z]{1,12}",
            ext in prop::sample::select(vec!["png", "jpg", "jpeg", "gif", "webp", "bmp"]),
            data in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let filename = format!("{stem}.{ext}");
            let adapter = ImageAdapter::new(filename.clone(), data.clone(), None).unwrap();
            prop_assert_eq!(adapter.filename(), filename.as_str());
            prop_assert_eq!(adapter.data().as_ref(), data.as_slice());
            prop_assert!(adapter.content_type().starts_with("image/"));
        }

        #[test]
        fn prop_unit_scale_is_identity(width in 1u32..10_000, height in 1u32..10_000) {
            prop_assert_eq!(
                scaled_dimensions((width, height), (1.0, 1.0), None).unwrap(),
                (width, height)
            );
        }
    }
}
