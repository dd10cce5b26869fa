//! Storage file capability
//!
//! The adapter never talks to a storage service directly. It consumes any
//! [`StorageFile`] (a name plus a base64 payload fetched on demand) and
//! produces [`FileRef`] values that the surrounding application hands back to
//! its storage SDK.
//!
//! # Examples
//!
//! ```rust
//! use acton_image::storage::FileRef;
//!
//! let file = FileRef::from_bytes("avatar.png", vec![0x89, 0x50, 0x4E, 0x47]);
//! assert_eq!(file.name(), "avatar.png");
//! assert_eq!(file.base64(), "iVBORw==");
//! ```

mod local;
mod traits;
mod types;

pub use local::LocalFile;
pub use traits::StorageFile;
#[cfg(test)]
pub use traits::MockStorageFile;
pub use types::{FilePayload, FileRef, StorageError, StorageResult};
