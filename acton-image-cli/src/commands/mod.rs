//! CLI command implementations

pub mod info;
pub mod transform;

pub use info::ImageInfo;
pub use transform::{default_output_path, Transform};

use acton_image::config::ImageConfig;
use anyhow::Result;
use clap::Subcommand;
use console::{style, Emoji};
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓", "√");

/// Image commands
#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Rotate an image
    Rotate {
        /// Image file to read
        input: PathBuf,

        /// Clockwise angle in degrees, a multiple of 90 (default: follow EXIF orientation)
        #[arg(short, long, allow_hyphen_values = true)]
        angle: Option<i32>,

        /// Where to write the result (default: `<stem>.rotate.<ext>` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resize an image to a width, a height, or both
    Resize {
        /// Image file to read
        input: PathBuf,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Where to write the result (default: `<stem>.resize.<ext>` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scale an image by factors of its size
    Scale {
        /// Image file to read
        input: PathBuf,

        /// Width multiplier
        #[arg(long, default_value_t = 1.0)]
        width_factor: f64,

        /// Height multiplier
        #[arg(long, default_value_t = 1.0)]
        height_factor: f64,

        /// Where to write the result (default: `<stem>.scale.<ext>` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show content type and dimensions of an image
    Info {
        /// Image file to read
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ImageCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be read or is not an image
    /// - Processing fails
    /// - The output cannot be written
    pub async fn execute(&self, config: &ImageConfig) -> Result<()> {
        match self {
            Self::Rotate {
                input,
                angle,
                output,
            } => {
                let transform = Transform::Rotate { angle: *angle };
                Self::transform(&transform, input, output.as_deref(), config).await
            }
            Self::Resize {
                input,
                width,
                height,
                output,
            } => {
                let transform = Transform::Resize {
                    width: *width,
                    height: *height,
                };
                Self::transform(&transform, input, output.as_deref(), config).await
            }
            Self::Scale {
                input,
                width_factor,
                height_factor,
                output,
            } => {
                let transform = Transform::Scale {
                    width_factor: *width_factor,
                    height_factor: *height_factor,
                };
                Self::transform(&transform, input, output.as_deref(), config).await
            }
            Self::Info { input, json } => {
                let info = ImageInfo::load(input, &config.processing).await?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&info.to_json())?);
                } else {
                    info.print();
                }
                Ok(())
            }
        }
    }

    async fn transform(
        transform: &Transform,
        input: &Path,
        output: Option<&Path>,
        config: &ImageConfig,
    ) -> Result<()> {
        let written = transform.run(input, output, &config.processing).await?;
        println!(
            "{} {} {}",
            SUCCESS,
            style(transform.name()).bold(),
            style(written.display()).cyan()
        );
        Ok(())
    }
}
