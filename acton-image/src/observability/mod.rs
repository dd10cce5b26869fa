//! Logging for image operations
//!
//! Every adapter operation (`from_file`, `edit`, `rotate`, `resize`,
//! `scale`) opens a span carrying the `filename` field. Inside it the adapter
//! emits `debug` events for fetched and scaled images and an `info` event
//! for every produced file; the raster backend adds a `debug` event with the
//! encoded format, dimensions and size.
//!
//! [`init`] installs a subscriber that writes those events to stderr, so
//! command output on stdout stays clean.
//!
//! ```bash
//! # Only produced files
//! RUST_LOG=acton_image=info acton-image resize photo.jpg --width 800
//!
//! # Encoder details as well
//! RUST_LOG=acton_image::processing=debug acton-image scale photo.jpg --width-factor 0.5
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "info,acton_image=debug"
    } else {
        "warn,acton_image=info"
    }
}

/// Installs the global subscriber
///
/// Debug builds print human readable lines; release builds print one JSON
/// object per event for log collectors.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use acton_image::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives()));

    let registry = tracing_subscriber::registry().with(env_filter);

    #[cfg(debug_assertions)]
    registry
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()?;

    #[cfg(not(debug_assertions))]
    registry
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
