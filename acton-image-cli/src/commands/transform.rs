//! Rotate, resize and scale commands

use acton_image::prelude::*;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file-to-file image operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Rotate by a multiple of 90 degrees, or upright from EXIF when `None`
    Rotate {
        /// Clockwise angle in degrees
        angle: Option<i32>,
    },
    /// Resize to a width, a height, or both
    Resize {
        /// Target width
        width: Option<u32>,
        /// Target height
        height: Option<u32>,
    },
    /// Scale by factors of the intrinsic size
    Scale {
        /// Width multiplier
        width_factor: f64,
        /// Height multiplier
        height_factor: f64,
    },
}

impl Transform {
    /// Short name, also used in default output file names
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rotate { .. } => "rotate",
            Self::Resize { .. } => "resize",
            Self::Scale { .. } => "scale",
        }
    }

    /// Reads `input`, applies the transform and writes the result
    ///
    /// Returns the path written to: `output`, or the default path derived
    /// from `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or is not an image, if
    /// processing fails, or if the output cannot be written.
    pub async fn run(
        &self,
        input: &Path,
        output: Option<&Path>,
        settings: &ProcessingSettings,
    ) -> Result<PathBuf> {
        let source = LocalFile::new(input);
        let adapter = ImageAdapter::from_file(&source)
            .await
            .with_context(|| format!("Failed to load {}", input.display()))?
            .with_backend(RasterBackend::from_settings(settings));

        let file = self
            .apply(&adapter)
            .await
            .with_context(|| format!("Failed to {} {}", self.name(), input.display()))?;

        let output = output.map_or_else(
            || default_output_path(input, self.name()),
            Path::to_path_buf,
        );
        let bytes = file.to_bytes()?;
        debug!(output = %output.display(), bytes = bytes.len(), "writing result");
        tokio::fs::write(&output, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        Ok(output)
    }

    async fn apply(&self, adapter: &ImageAdapter) -> ImageResult<FileRef> {
        match *self {
            Self::Rotate { angle } => adapter.rotate(angle).await,
            Self::Resize { width, height } => adapter.resize(width, height).await,
            Self::Scale {
                width_factor,
                height_factor,
            } => adapter.scale(width_factor, height_factor).await,
        }
    }
}

/// `<stem>.<operation>.<ext>` in the input's directory
///
/// ```rust
/// use acton_image_cli_lib::default_output_path;
/// use std::path::Path;
///
/// let path = default_output_path(Path::new("photos/cat.jpg"), "rotate");
/// assert_eq!(path, Path::new("photos/cat.rotate.jpg"));
/// ```
#[must_use]
pub fn default_output_path(input: &Path, operation: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or(Cow::Borrowed("image"), |stem| stem.to_string_lossy());
    let name = match input.extension() {
        Some(ext) => format!("{stem}.{operation}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{operation}"),
    };
    input.with_file_name(name)
}
