/// Chunk assembly: concatenate staged chunks into the final media file
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::metrics;
use crate::storage::{ChunkStore, MediaStore, StorageError, UploadId};
use crate::tracker::UploadTracker;

/// Paths produced by a successful assembly, relative to the permanent roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledUpload {
    pub media_file: String,
    pub thumbnail_file: Option<String>,
}

#[derive(Clone)]
pub struct Assembler {
    chunks: ChunkStore,
    media: MediaStore,
    tracker: Arc<dyn UploadTracker>,
}

impl Assembler {
    pub fn new(chunks: ChunkStore, media: MediaStore, tracker: Arc<dyn UploadTracker>) -> Self {
        Self {
            chunks,
            media,
            tracker,
        }
    }

    /// Concatenate chunks `0..expected_total` in index order.
    ///
    /// A missing chunk fails with `IncompleteUpload` before the destination is
    /// touched, and staging is left in place for a later attempt. On success
    /// staging and tracker state for the upload are removed.
    pub async fn assemble(&self, upload_id: &UploadId, expected_total: u32) -> Result<AssembledUpload> {
        let started = Instant::now();
        let result = self.concatenate(upload_id, expected_total).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::record_assembly(status, started.elapsed());
        result
    }

    async fn concatenate(&self, upload_id: &UploadId, expected_total: u32) -> Result<AssembledUpload> {
        for index in 0..expected_total {
            if !self.chunks.has_chunk(upload_id, index).await? {
                return Err(missing_chunk(upload_id, index, expected_total));
            }
        }

        let (media_file, file) = self.media.create_assembled(upload_id).await?;
        let mut writer = BufWriter::new(file);
        let mut written: u64 = 0;

        for index in 0..expected_total {
            let chunk = self
                .chunks
                .read_chunk(upload_id, index)
                .await
                .map_err(|e| match e {
                    StorageError::NotFound(_) => missing_chunk(upload_id, index, expected_total),
                    other => other.into(),
                })?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        // Resolve the thumbnail before staging (and its marker) disappears.
        let thumbnail_file = match self.tracker.thumbnail(upload_id).await? {
            Some(name) => Some(name),
            None => self.chunks.thumbnail_marker(upload_id).await?,
        };

        self.chunks.purge(upload_id).await;
        if let Err(e) = self.tracker.clear(upload_id).await {
            warn!(file_id = %upload_id, backend = self.tracker.backend(), "failed to clear tracker state: {}", e);
        }

        info!(
            file_id = %upload_id,
            total_chunks = expected_total,
            bytes = written,
            media_file = %media_file,
            "upload assembled"
        );

        Ok(AssembledUpload {
            media_file,
            thumbnail_file,
        })
    }
}

fn missing_chunk(upload_id: &UploadId, index: u32, expected_total: u32) -> AppError {
    AppError::IncompleteUpload(format!(
        "chunk {index} of {expected_total} missing for upload {upload_id}"
    ))
}
