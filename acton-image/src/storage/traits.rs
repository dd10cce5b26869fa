//! Storage file trait definition

use super::types::StorageResult;
use async_trait::async_trait;

/// A file held by an external storage service
///
/// Implementations are handles, not data: [`StorageFile::get_data`] may hit
/// the network or the filesystem every time it is called.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_image::storage::{FileRef, StorageFile};
///
/// # async fn example() -> anyhow::Result<()> {
/// let file = FileRef::from_base64("pixel.gif", "R0lGODlhAQABAAAAACw=");
/// let payload = file.get_data().await?;
/// println!("{} carries {} base64 characters", StorageFile::name(&file), payload.len());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageFile: Send + Sync {
    /// Name of the file as known to the storage service
    fn name(&self) -> String;

    /// Content type recorded by the storage service, if any
    ///
    /// When `None`, consumers derive the type from [`StorageFile::name`].
    fn content_type(&self) -> Option<String> {
        None
    }

    /// Fetches the file contents as base64 text
    ///
    /// # Errors
    ///
    /// Returns an error if the storage service cannot produce the payload
    /// (missing file, I/O failure, transport failure).
    async fn get_data(&self) -> StorageResult<String>;
}
