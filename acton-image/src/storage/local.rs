//! Storage file backed by the local filesystem

use super::traits::StorageFile;
use super::types::{StorageError, StorageResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A file on local disk, read lazily
///
/// Lets command line tools and tests drive the adapter without a storage
/// service. The name reported to the adapter is the final path component.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_image::prelude::*;
///
/// # async fn example() -> anyhow::Result<()> {
/// let source = LocalFile::new("/tmp/photo.jpg");
/// let adapter = ImageAdapter::from_file(&source).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Creates a handle for `path` without touching the filesystem
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageFile for LocalFile {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.to_string_lossy(), |name| name.to_string_lossy())
            .into_owned()
    }

    async fn get_data(&self) -> StorageResult<String> {
        let data = fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(self.path.display().to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(STANDARD.encode(data))
    }
}
