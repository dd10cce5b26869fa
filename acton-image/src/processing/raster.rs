//! Image processing on top of the `image` crate

use super::exif::{apply_orientation, insert_jpeg_app1, read_exif, reset_orientation};
use super::traits::{ImageBackend, ImageHandle};
use super::types::{ImageMetadata, ProcessingError, ProcessingResult};
use crate::config::ProcessingSettings;
use async_trait::async_trait;
use bytes::Bytes;
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageFormat, ImageReader,
};
use std::io::Cursor;

/// Backend decoding and encoding with the `image` crate
///
/// The output format always matches the detected input format.
///
/// # Examples
///
/// ```rust
/// use acton_image::processing::RasterBackend;
/// use image::imageops::FilterType;
///
/// let backend = RasterBackend::new().with_filter(FilterType::Nearest);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RasterBackend {
    filter: FilterType,
    jpeg_quality: u8,
    keep_metadata: bool,
    max_input_bytes: u64,
    max_output_pixels: u64,
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::from_settings(&ProcessingSettings::default())
    }
}

impl RasterBackend {
    /// Creates a backend with default settings
    ///
    /// Uses `FilterType::Lanczos3` for high-quality resizing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend from the `[processing]` configuration section
    #[must_use]
    pub fn from_settings(settings: &ProcessingSettings) -> Self {
        Self {
            filter: settings.filter.into(),
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
            keep_metadata: settings.keep_metadata,
            max_input_bytes: settings.max_input_bytes,
            max_output_pixels: settings.max_output_pixels,
        }
    }

    /// Uses a specific resize filter
    #[must_use]
    pub const fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Resize filter in use
    #[must_use]
    pub const fn filter(&self) -> FilterType {
        self.filter
    }
}

impl ImageBackend for RasterBackend {
    type Handle = RasterHandle;

    fn open(&self, data: Bytes) -> RasterHandle {
        RasterHandle {
            data,
            operations: Vec::new(),
            keep_metadata: false,
            backend: *self,
        }
    }

    fn max_output_pixels(&self) -> Option<u64> {
        Some(self.max_output_pixels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Rotate(Option<i32>),
    Resize {
        width: Option<u32>,
        height: Option<u32>,
    },
}

/// Pending pipeline over one source image
///
/// Decoding and encoding run on tokio's blocking pool, so awaiting
/// [`ImageHandle::metadata`] or [`ImageHandle::to_buffer`] requires a tokio
/// runtime.
#[derive(Debug, Clone)]
pub struct RasterHandle {
    data: Bytes,
    operations: Vec<Operation>,
    keep_metadata: bool,
    backend: RasterBackend,
}

impl RasterHandle {
    fn check_size(&self) -> ProcessingResult<()> {
        let actual = self.data.len() as u64;
        if actual > self.backend.max_input_bytes {
            return Err(ProcessingError::InputTooLarge {
                actual,
                limit: self.backend.max_input_bytes,
            });
        }
        Ok(())
    }

    fn check_output(&self, width: u32, height: u32) -> ProcessingResult<()> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.backend.max_output_pixels {
            return Err(ProcessingError::InvalidDimensions(format!(
                "{width}x{height} exceeds the limit of {} pixels",
                self.backend.max_output_pixels
            )));
        }
        Ok(())
    }

    fn reader(&self) -> ProcessingResult<ImageReader<Cursor<&[u8]>>> {
        let reader = ImageReader::new(Cursor::new(&self.data[..]))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(format!("Failed to read image: {e}")))?;
        if reader.format().is_none() {
            return Err(ProcessingError::UnsupportedFormat(
                "content is not a recognised image".to_string(),
            ));
        }
        Ok(reader)
    }

    fn decode(&self) -> ProcessingResult<(DynamicImage, ImageFormat)> {
        let reader = self.reader()?;
        let format = reader
            .format()
            .ok_or_else(|| ProcessingError::UnsupportedFormat("unknown".to_string()))?;
        let image = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        Ok((image, format))
    }

    fn resize_image(
        &self,
        image: DynamicImage,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ProcessingResult<DynamicImage> {
        let (source_width, source_height) = (image.width(), image.height());
        match (width, height) {
            (None, None) => Ok(image),
            (Some(0), _) | (_, Some(0)) => Err(ProcessingError::InvalidDimensions(format!(
                "cannot resize to {width:?}x{height:?}"
            ))),
            (Some(w), Some(h)) if (w, h) == (source_width, source_height) => Ok(image),
            (Some(w), Some(h)) => {
                // Covering resize scales past the target before cropping
                let cover_width = w.max(proportional(source_width, h, source_height));
                let cover_height = h.max(proportional(source_height, w, source_width));
                self.check_output(w, h)?;
                self.check_output(cover_width, cover_height)?;
                Ok(image.resize_to_fill(w, h, self.backend.filter))
            }
            (Some(w), None) => {
                let h = proportional(source_height, w, source_width);
                self.check_output(w, h)?;
                Ok(image.resize_exact(w, h, self.backend.filter))
            }
            (None, Some(h)) => {
                let w = proportional(source_width, h, source_height);
                self.check_output(w, h)?;
                Ok(image.resize_exact(w, h, self.backend.filter))
            }
        }
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> ProcessingResult<Vec<u8>> {
        let mut buffer = Vec::new();
        if format == ImageFormat::Jpeg {
            // JPEG has no alpha and no 16-bit mode
            let converted;
            let image = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                other => {
                    converted = DynamicImage::ImageRgb8(other.to_rgb8());
                    &converted
                }
            };
            let encoder = JpegEncoder::new_with_quality(&mut buffer, self.backend.jpeg_quality);
            image
                .write_with_encoder(encoder)
                .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        } else {
            image
                .write_to(&mut Cursor::new(&mut buffer), format)
                .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        }
        Ok(buffer)
    }

    fn inspect(&self) -> ProcessingResult<ImageMetadata> {
        self.check_size()?;
        let reader = self.reader()?;
        let format = reader.format();
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ProcessingError::Decode(format!("Failed to get dimensions: {e}")))?;
        let exif = read_exif(&self.data);

        Ok(ImageMetadata {
            width,
            height,
            format,
            orientation: exif.as_ref().and_then(|block| block.orientation),
            has_exif: exif.is_some(),
            size: self.data.len(),
        })
    }

    fn render(&self) -> ProcessingResult<Vec<u8>> {
        self.check_size()?;
        let (mut image, format) = self.decode()?;
        let exif = read_exif(&self.data);

        // Auto-orientation precedes every other operation
        let mut reoriented = false;
        if self.operations.contains(&Operation::Rotate(None)) {
            let orientation = exif.as_ref().and_then(|block| block.orientation);
            if let Some(value) = orientation.filter(|value| *value != 1) {
                image = apply_orientation(image, value);
                reoriented = true;
            }
        }

        for operation in &self.operations {
            image = match *operation {
                Operation::Rotate(None) => image,
                Operation::Rotate(Some(angle)) => rotate_by(image, angle)?,
                Operation::Resize { width, height } => self.resize_image(image, width, height)?,
            };
        }

        let mut buffer = self.encode(&image, format)?;

        if self.keep_metadata && format == ImageFormat::Jpeg {
            if let Some(mut block) = exif {
                if reoriented {
                    reset_orientation(&mut block.tiff);
                }
                buffer = insert_jpeg_app1(buffer, &block.tiff);
            }
        }

        tracing::debug!(
            format = ?format,
            operations = self.operations.len(),
            width = image.width(),
            height = image.height(),
            bytes = buffer.len(),
            "encoded image"
        );

        Ok(buffer)
    }
}

#[async_trait]
impl ImageHandle for RasterHandle {
    fn rotate(mut self, angle: Option<i32>) -> Self {
        self.operations.push(Operation::Rotate(angle));
        self
    }

    fn resize(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.operations.push(Operation::Resize { width, height });
        self
    }

    fn with_metadata(mut self) -> Self {
        self.keep_metadata = self.backend.keep_metadata;
        self
    }

    async fn metadata(&self) -> ProcessingResult<ImageMetadata> {
        let handle = self.clone();
        tokio::task::spawn_blocking(move || handle.inspect()).await?
    }

    async fn to_buffer(self) -> ProcessingResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || self.render()).await?
    }
}

fn rotate_by(image: DynamicImage, angle: i32) -> ProcessingResult<DynamicImage> {
    match angle.rem_euclid(360) {
        0 => Ok(image),
        90 => Ok(image.rotate90()),
        180 => Ok(image.rotate180()),
        270 => Ok(image.rotate270()),
        _ => Err(ProcessingError::UnsupportedAngle(angle)),
    }
}

/// `round(other * target / original)`, never below one pixel
fn proportional(other: u32, target: u32, original: u32) -> u32 {
    let original = u64::from(original.max(1));
    let value = (u64::from(other) * u64::from(target) + original / 2) / original;
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}
