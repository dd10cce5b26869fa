//! Testing utilities
//!
//! Provides:
//! - In-memory fixture images (PNG, JPEG, JPEG with an EXIF orientation)
//! - `RecordingBackend`, an [`ImageBackend`] that records every call made on
//!   its handles and returns canned results

use crate::processing::exif::insert_jpeg_app1;
use crate::processing::{ImageBackend, ImageHandle, ImageMetadata, ProcessingResult};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Rgb};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, 128])
    });

    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    buffer
}

/// Creates a PNG image
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Creates a JPEG image without EXIF
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

/// Builds a minimal TIFF block holding only an orientation entry
pub fn tiff_with_orientation(orientation: u16, big_endian: bool) -> Vec<u8> {
    let u16_bytes = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32_bytes = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut tiff = Vec::new();
    tiff.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    tiff.extend_from_slice(&u16_bytes(42));
    tiff.extend_from_slice(&u32_bytes(8));
    // IFD0 with a single SHORT entry
    tiff.extend_from_slice(&u16_bytes(1));
    tiff.extend_from_slice(&u16_bytes(0x0112));
    tiff.extend_from_slice(&u16_bytes(3));
    tiff.extend_from_slice(&u32_bytes(1));
    tiff.extend_from_slice(&u16_bytes(orientation));
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&u32_bytes(0));
    tiff
}

/// Creates a JPEG whose EXIF block carries `orientation`
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    insert_jpeg_app1(
        create_test_jpeg(width, height),
        &tiff_with_orientation(orientation, false),
    )
}

/// Reads the pixel dimensions of encoded image bytes
pub fn dimensions(data: &[u8]) -> (u32, u32) {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .unwrap()
        .into_dimensions()
        .unwrap()
}

/// A call observed by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(Bytes),
    WithMetadata,
    Rotate(Option<i32>),
    Resize(Option<u32>, Option<u32>),
    Metadata,
    ToBuffer,
}

/// Backend double that records calls and returns canned results
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    width: u32,
    height: u32,
    output: Vec<u8>,
    max_output_pixels: Option<u64>,
}

impl RecordingBackend {
    /// Handles report `width` x `height` and encode to `output`
    pub fn new(width: u32, height: u32, output: impl Into<Vec<u8>>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            width,
            height,
            output: output.into(),
            max_output_pixels: None,
        }
    }

    /// Reports an output pixel limit to the adapter
    pub fn with_max_output_pixels(mut self, limit: u64) -> Self {
        self.max_output_pixels = Some(limit);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Open(_)))
            .count()
    }
}

impl ImageBackend for RecordingBackend {
    type Handle = RecordingHandle;

    fn open(&self, data: Bytes) -> RecordingHandle {
        self.calls.lock().unwrap().push(Call::Open(data));
        RecordingHandle {
            backend: self.clone(),
        }
    }

    fn max_output_pixels(&self) -> Option<u64> {
        self.max_output_pixels
    }
}

#[derive(Debug)]
pub struct RecordingHandle {
    backend: RecordingBackend,
}

impl RecordingHandle {
    fn record(&self, call: Call) {
        self.backend.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ImageHandle for RecordingHandle {
    fn rotate(self, angle: Option<i32>) -> Self {
        self.record(Call::Rotate(angle));
        self
    }

    fn resize(self, width: Option<u32>, height: Option<u32>) -> Self {
        self.record(Call::Resize(width, height));
        self
    }

    fn with_metadata(self) -> Self {
        self.record(Call::WithMetadata);
        self
    }

    async fn metadata(&self) -> ProcessingResult<ImageMetadata> {
        self.record(Call::Metadata);
        Ok(ImageMetadata {
            width: self.backend.width,
            height: self.backend.height,
            format: Some(ImageFormat::Png),
            orientation: None,
            has_exif: false,
            size: 0,
        })
    }

    async fn to_buffer(self) -> ProcessingResult<Vec<u8>> {
        self.record(Call::ToBuffer);
        Ok(self.backend.output.clone())
    }
}
