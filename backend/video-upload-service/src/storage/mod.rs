//! Filesystem storage for chunked uploads
//!
//! Two areas live on disk:
//! - `ChunkStore`: per-upload staging directories under the temp root
//! - `MediaStore`: permanent `uploads/` and `thumbnails/` roots
//!
//! Every path is built from a validated `UploadId` or a checked file name so
//! client input can never escape the configured roots.

mod chunk_store;
mod media_store;

pub use chunk_store::{ChunkStore, THUMBNAIL_MARKER};
pub use media_store::{MediaKind, MediaStore};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

const MAX_UPLOAD_ID_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid upload identifier: {0}")]
    InvalidId(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Identifier shared by every chunk of one upload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId(String);

impl UploadId {
    /// Validate a client-supplied identifier
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_UPLOAD_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StorageError::InvalidId(raw.to_string()))
        }
    }

    /// Generate a fresh identifier for a client that did not send one
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UploadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A bare file name with no directory components
pub(crate) fn check_file_name(name: &str) -> StorageResult<&str> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);

    if valid {
        Ok(name)
    } else {
        Err(StorageError::InvalidFileName(name.to_string()))
    }
}

/// Milliseconds since the Unix epoch, used to keep generated names unique
pub(crate) fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
