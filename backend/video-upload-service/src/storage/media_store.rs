//! Permanent media roots (`uploads/` and `thumbnails/`).

use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::{self, File};
use tracing::debug;

use super::{check_file_name, timestamp_millis, StorageResult, UploadId};

/// Which permanent root a file lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
}

impl MediaKind {
    /// Public URL prefix the static mounts serve this kind under
    pub fn url_prefix(&self) -> &'static str {
        match self {
            Self::Video => "/uploads",
            Self::Thumbnail => "/thumbnails",
        }
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix(), file_name)
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    uploads_root: PathBuf,
    thumbnails_root: PathBuf,
}

impl MediaStore {
    pub fn new(uploads_root: impl Into<PathBuf>, thumbnails_root: impl Into<PathBuf>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
            thumbnails_root: thumbnails_root.into(),
        }
    }

    /// Create both roots if they do not exist yet
    pub async fn ensure_dirs(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.uploads_root).await?;
        fs::create_dir_all(&self.thumbnails_root).await?;
        Ok(())
    }

    fn root(&self, kind: MediaKind) -> &PathBuf {
        match kind {
            MediaKind::Video => &self.uploads_root,
            MediaKind::Thumbnail => &self.thumbnails_root,
        }
    }

    /// Absolute location of a stored file; rejects names with path components
    pub fn resolve(&self, kind: MediaKind, file_name: &str) -> StorageResult<PathBuf> {
        Ok(self.root(kind).join(check_file_name(file_name)?))
    }

    /// Name of the file an upload is assembled into
    pub fn assembled_name(upload_id: &UploadId) -> String {
        format!("{}.mp4", upload_id)
    }

    /// Create (or truncate) the destination of an assembly
    pub async fn create_assembled(&self, upload_id: &UploadId) -> StorageResult<(String, File)> {
        fs::create_dir_all(&self.uploads_root).await?;
        let name = Self::assembled_name(upload_id);
        let file = File::create(self.uploads_root.join(&name)).await?;
        Ok((name, file))
    }

    /// Write a replacement video. The name embeds a timestamp so it never
    /// collides with the file it replaces.
    pub async fn write_replacement_video(&self, file_id: &str, data: &[u8]) -> StorageResult<String> {
        let name = format!("{}_updated_{}.mp4", file_id, timestamp_millis());
        self.write(MediaKind::Video, &name, data).await?;
        Ok(name)
    }

    /// Write a replacement thumbnail, named like `write_replacement_video`.
    pub async fn write_replacement_thumbnail(
        &self,
        file_id: &str,
        data: &[u8],
    ) -> StorageResult<String> {
        let name = format!("{}_thumb_updated_{}.jpg", file_id, timestamp_millis());
        self.write(MediaKind::Thumbnail, &name, data).await?;
        Ok(name)
    }

    async fn write(&self, kind: MediaKind, file_name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.resolve(kind, file_name)?;
        fs::create_dir_all(self.root(kind)).await?;
        fs::write(&path, data).await?;
        debug!(path = %path.display(), bytes = data.len(), "media file written");
        Ok(())
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, kind: MediaKind, file_name: &str) -> StorageResult<()> {
        let path = self.resolve(kind, file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
