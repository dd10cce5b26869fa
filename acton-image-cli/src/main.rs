//! acton-image CLI tool

#![allow(clippy::multiple_crate_versions)]

use acton_image::config::ImageConfig;
use acton_image::observability;
use acton_image_cli_lib::Cli;
use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init()?;

    let config = match &cli.config {
        Some(path) => ImageConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ImageConfig::load().context("Failed to load configuration")?,
    };

    cli.command.execute(&config).await
}
