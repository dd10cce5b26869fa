//! Image info command

use acton_image::prelude::*;
use anyhow::{Context, Result};
use console::{style, Emoji};
use std::path::Path;

static INFO: Emoji = Emoji("ℹ", "i");

/// What `acton-image info` reports about a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// File name
    pub filename: String,
    /// Content type derived from the file name
    pub content_type: String,
    /// Properties read from the image content
    pub metadata: ImageMetadata,
}

impl ImageInfo {
    /// Reads `input` and inspects it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not an image, or
    /// cannot be decoded.
    pub async fn load(input: &Path, settings: &ProcessingSettings) -> Result<Self> {
        let adapter = ImageAdapter::from_file(&LocalFile::new(input))
            .await
            .with_context(|| format!("Failed to load {}", input.display()))?
            .with_backend(RasterBackend::from_settings(settings));

        let metadata = adapter
            .pipeline()
            .metadata()
            .await
            .with_context(|| format!("Failed to inspect {}", input.display()))?;

        Ok(Self {
            filename: adapter.filename().to_string(),
            content_type: adapter.content_type().to_string(),
            metadata,
        })
    }

    /// JSON form of the report
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "filename": self.filename,
            "content_type": self.content_type,
            "detected_type": self.metadata.mime_type(),
            "width": self.metadata.width,
            "height": self.metadata.height,
            "orientation": self.metadata.orientation,
            "has_exif": self.metadata.has_exif,
            "size": self.metadata.size,
        })
    }

    /// Prints the report for humans
    pub fn print(&self) {
        println!("\n{} {}", INFO, style(&self.filename).bold());
        println!("  Content type:  {}", style(&self.content_type).cyan());
        if let Some(detected) = self.metadata.mime_type() {
            println!("  Detected:      {}", style(detected).cyan());
        }
        println!(
            "  Dimensions:    {}",
            style(format!("{}x{}", self.metadata.width, self.metadata.height)).green()
        );
        match self.metadata.orientation {
            Some(orientation) => println!("  Orientation:   {orientation}"),
            None => println!("  Orientation:   {}", style("none").dim()),
        }
        println!("  Size:          {} bytes", self.metadata.size);
        println!();
    }
}
