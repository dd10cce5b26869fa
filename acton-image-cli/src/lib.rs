//! acton-image CLI library

#![allow(clippy::multiple_crate_versions)]

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{default_output_path, ImageCommand, ImageInfo, Transform};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "acton-image")]
#[command(version)]
#[command(about = "Rotate, resize and scale image files", long_about = None)]
pub struct Cli {
    /// Load settings from this TOML file instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: ImageCommand,
}
