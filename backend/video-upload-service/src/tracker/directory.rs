use async_trait::async_trait;

use super::UploadTracker;
use crate::error::Result;
use crate::storage::{ChunkStore, UploadId};

/// Reads upload state straight from the chunk staging directory.
///
/// Writing a chunk file already records it, so the `record_*` calls have
/// nothing left to do.
#[derive(Debug, Clone)]
pub struct DirectoryTracker {
    chunks: ChunkStore,
}

impl DirectoryTracker {
    pub fn new(chunks: ChunkStore) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl UploadTracker for DirectoryTracker {
    async fn record_chunk(&self, _upload_id: &UploadId, _index: u32) -> Result<()> {
        Ok(())
    }

    async fn record_thumbnail(&self, _upload_id: &UploadId, _thumbnail: &str) -> Result<()> {
        Ok(())
    }

    async fn thumbnail(&self, upload_id: &UploadId) -> Result<Option<String>> {
        Ok(self.chunks.thumbnail_marker(upload_id).await?)
    }

    async fn received_count(&self, upload_id: &UploadId) -> Result<usize> {
        Ok(self.chunks.chunk_indices(upload_id).await?.len())
    }

    async fn clear(&self, upload_id: &UploadId) -> Result<()> {
        self.chunks.purge(upload_id).await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "directory"
    }
}
