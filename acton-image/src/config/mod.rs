//! Configuration management for acton-image
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_IMAGE_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/acton-image/config.toml` (user config, XDG)
//! 4. `/etc/acton-image/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `ACTON_IMAGE_SECTION__FIELD_NAME`
//! - Example: `ACTON_IMAGE_PROCESSING__JPEG_QUALITY=90`
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [processing]
//! filter = "lanczos3"
//! jpeg_quality = 85
//! keep_metadata = true
//! max_input_bytes = 26214400
//! max_output_pixels = 268402689
//! ```
//!
//! # Usage
//!
//! ```rust
//! use acton_image::config::ImageConfig;
//! use acton_image::processing::RasterBackend;
//!
//! let config = ImageConfig::default();
//! let backend = RasterBackend::from_settings(&config.processing);
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "ACTON_IMAGE_";

/// Default output pixel limit, 16383 x 16383
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 0x3FFF * 0x3FFF;

/// Resampling filter used when resizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour
    Nearest,
    /// Linear
    Triangle,
    /// Cubic
    #[serde(alias = "catmull_rom")]
    CatmullRom,
    /// Gaussian
    Gaussian,
    /// Lanczos with window 3 (recommended)
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Gaussian => Self::Gaussian,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Image processing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Resize filter
    pub filter: ResizeFilter,

    /// JPEG output quality (1-100)
    pub jpeg_quality: u8,

    /// Honour `with_metadata()` by carrying EXIF into JPEG output
    pub keep_metadata: bool,

    /// Largest source image accepted, in bytes
    pub max_input_bytes: u64,

    /// Largest resize or scale target accepted, in pixels (width x height)
    pub max_output_pixels: u64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::Lanczos3,
            jpeg_quality: 80,
            keep_metadata: true,
            max_input_bytes: 25 * 1024 * 1024, // 25 MiB
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Complete acton-image configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image processing settings
    #[serde(default)]
    pub processing: ProcessingSettings,
}

impl ImageConfig {
    /// Load configuration from the standard locations
    ///
    /// Searches, lowest priority first: defaults,
    /// `/etc/acton-image/config.toml`, the XDG user config, `./config.toml`,
    /// then `ACTON_IMAGE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be parsed
    /// - Configuration values fail type conversion
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // 5. Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 4. System config
        let system_config = PathBuf::from("/etc/acton-image/config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 3. User config
        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        // 2. Local config
        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 1. Environment variables (highest priority, double underscore for nesting)
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path
    ///
    /// ```rust
    /// use acton_image::config::ImageConfig;
    ///
    /// let path = ImageConfig::recommended_path();
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| config_dir.join("acton-image").join("config.toml"),
        )
    }
}
