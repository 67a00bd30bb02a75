//! Per-upload staging directories.
//!
//! Layout:
//! ```text
//! {temp_root}/
//!   {upload_id}/
//!     0, 1, 2, ...      # raw chunk bytes, named by zero-based index
//!     thumbnail.txt     # sidecar marker: generated thumbnail file name
//! {thumbnails_root}/
//!   {upload_id}_thumb_{millis}.jpg
//! ```

use bytes::Bytes;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::{timestamp_millis, StorageError, StorageResult, UploadId};

/// Sidecar file holding the thumbnail name until assembly
pub const THUMBNAIL_MARKER: &str = "thumbnail.txt";

#[derive(Debug, Clone)]
pub struct ChunkStore {
    temp_root: PathBuf,
    thumbnails_root: PathBuf,
}

impl ChunkStore {
    pub fn new(temp_root: impl Into<PathBuf>, thumbnails_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            thumbnails_root: thumbnails_root.into(),
        }
    }

    pub fn session_dir(&self, upload_id: &UploadId) -> PathBuf {
        self.temp_root.join(upload_id.as_str())
    }

    fn chunk_path(&self, upload_id: &UploadId, index: u32) -> PathBuf {
        self.session_dir(upload_id).join(index.to_string())
    }

    /// Write one chunk. Re-sending an index overwrites the previous bytes.
    pub async fn write_chunk(
        &self,
        upload_id: &UploadId,
        index: u32,
        data: &[u8],
    ) -> StorageResult<PathBuf> {
        let dir = self.session_dir(upload_id);
        fs::create_dir_all(&dir).await?;

        let path = self.chunk_path(upload_id, index);
        fs::write(&path, data).await?;
        debug!(file_id = %upload_id, chunk_index = index, bytes = data.len(), "chunk written");
        Ok(path)
    }

    /// Store the thumbnail permanently and remember its name in the sidecar marker.
    ///
    /// Returns the generated file name (relative to the thumbnails root).
    pub async fn write_thumbnail(&self, upload_id: &UploadId, data: &[u8]) -> StorageResult<String> {
        fs::create_dir_all(&self.thumbnails_root).await?;
        let file_name = format!("{}_thumb_{}.jpg", upload_id, timestamp_millis());
        fs::write(self.thumbnails_root.join(&file_name), data).await?;

        let dir = self.session_dir(upload_id);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(THUMBNAIL_MARKER), file_name.as_bytes()).await?;

        debug!(file_id = %upload_id, thumbnail = %file_name, "thumbnail written");
        Ok(file_name)
    }

    pub async fn read_chunk(&self, upload_id: &UploadId, index: u32) -> StorageResult<Bytes> {
        let path = self.chunk_path(upload_id, index);
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(path)),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    pub async fn has_chunk(&self, upload_id: &UploadId, index: u32) -> StorageResult<bool> {
        Ok(fs::try_exists(self.chunk_path(upload_id, index)).await?)
    }

    /// Thumbnail name recorded by `write_thumbnail`, if any
    pub async fn thumbnail_marker(&self, upload_id: &UploadId) -> StorageResult<Option<String>> {
        let path = self.session_dir(upload_id).join(THUMBNAIL_MARKER);
        match fs::read_to_string(&path).await {
            Ok(name) => {
                let name = name.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Indices of the chunk files currently staged. Markers are skipped.
    pub async fn chunk_indices(&self, upload_id: &UploadId) -> StorageResult<BTreeSet<u32>> {
        let dir = self.session_dir(upload_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut indices = BTreeSet::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(index) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            {
                indices.insert(index);
            }
        }
        Ok(indices)
    }

    /// Remove the staging directory. Best effort: failures are only logged.
    pub async fn purge(&self, upload_id: &UploadId) {
        let dir = self.session_dir(upload_id);
        if let Err(e) = remove_dir_all_if_exists(&dir).await {
            warn!(file_id = %upload_id, path = %dir.display(), "failed to purge chunk directory: {}", e);
        }
    }
}

async fn remove_dir_all_if_exists(dir: &Path) -> std::io::Result<()> {
    match fs::remove_dir_all(dir).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> ChunkStore {
        ChunkStore::new(tmp.path().join("temp"), tmp.path().join("thumbnails"))
    }

    #[tokio::test]
    async fn test_write_and_read_chunk() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let id = UploadId::parse("abc").unwrap();

        let path = store.write_chunk(&id, 3, b"hello").await.unwrap();
        assert_eq!(path, tmp.path().join("temp").join("abc").join("3"));
        assert_eq!(&store.read_chunk(&id, 3).await.unwrap()[..], b"hello");
    }

    #[tokio::test]
    async fn test_rewriting_chunk_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let id = UploadId::parse("abc").unwrap();

        store.write_chunk(&id, 0, b"first attempt").await.unwrap();
        store.write_chunk(&id, 0, b"retry").await.unwrap();

        assert_eq!(&store.read_chunk(&id, 0).await.unwrap()[..], b"retry");
        assert_eq!(store.chunk_indices(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_chunk_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let id = UploadId::parse("abc").unwrap();

        let err = store.read_chunk(&id, 0).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_thumbnail_marker_excluded_from_indices() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let id = UploadId::parse("abc").unwrap();

        store.write_chunk(&id, 0, b"a").await.unwrap();
        store.write_chunk(&id, 2, b"c").await.unwrap();
        let thumb = store.write_thumbnail(&id, b"jpeg").await.unwrap();

        assert!(thumb.starts_with("abc_thumb_"));
        assert!(thumb.ends_with(".jpg"));
        assert!(tmp.path().join("thumbnails").join(&thumb).exists());
        assert_eq!(store.thumbnail_marker(&id).await.unwrap(), Some(thumb));
        assert_eq!(
            store.chunk_indices(&id).await.unwrap().into_iter().collect::<Vec<_>>(),
            vec![0, 2]
        );
    }

    #[tokio::test]
    async fn test_purge_removes_directory_and_tolerates_absence() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let id = UploadId::parse("abc").unwrap();

        store.write_chunk(&id, 0, b"a").await.unwrap();
        store.purge(&id).await;
        assert!(!store.session_dir(&id).exists());

        store.purge(&id).await;
        assert!(store.chunk_indices(&id).await.unwrap().is_empty());
    }
}
