//! Upload tracking: which chunk indices of an upload have arrived.
//!
//! Backends:
//! - `DirectoryTracker`: derives state from the chunk staging directory
//! - `RedisTracker`: Redis set per upload with a TTL
//! - `MemoryTracker`: process-local map
//!
//! The directory backend has no expiry, so abandoned uploads leak their
//! staging directory. The Redis backend expires tracking state after the TTL
//! while chunk files stay on disk; an upload resumed after expiry does not
//! reach its declared total unless the earlier chunks are sent again.

mod directory;
mod memory;
mod redis_set;

pub use directory::DirectoryTracker;
pub use memory::MemoryTracker;
pub use redis_set::RedisTracker;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{TrackerBackend, TrackerConfig};
use crate::error::{AppError, Result};
use crate::storage::{ChunkStore, UploadId};

#[async_trait]
pub trait UploadTracker: Send + Sync {
    /// Mark a chunk index as received. Repeating an index is a no-op.
    async fn record_chunk(&self, upload_id: &UploadId, index: u32) -> Result<()>;

    /// Remember the thumbnail file name for this upload (last write wins)
    async fn record_thumbnail(&self, upload_id: &UploadId, thumbnail: &str) -> Result<()>;

    async fn thumbnail(&self, upload_id: &UploadId) -> Result<Option<String>>;

    /// Number of distinct chunk indices received so far
    async fn received_count(&self, upload_id: &UploadId) -> Result<usize>;

    async fn is_complete(&self, upload_id: &UploadId, expected_total: u32) -> Result<bool> {
        Ok(self.received_count(upload_id).await? == expected_total as usize)
    }

    /// Drop all tracking state for an upload
    async fn clear(&self, upload_id: &UploadId) -> Result<()>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}

/// Build the tracker selected by configuration
pub async fn from_config(
    config: &TrackerConfig,
    chunks: ChunkStore,
) -> Result<Arc<dyn UploadTracker>> {
    let tracker: Arc<dyn UploadTracker> = match config.backend {
        TrackerBackend::Directory => Arc::new(DirectoryTracker::new(chunks)),
        TrackerBackend::Memory => Arc::new(MemoryTracker::new()),
        TrackerBackend::Redis => {
            let client = redis::Client::open(config.redis_url.as_str())
                .map_err(|e| AppError::CacheError(format!("Invalid REDIS_URL: {e}")))?;
            Arc::new(RedisTracker::new(client, Some(config.ttl_secs)).await?)
        }
    };

    info!(backend = tracker.backend(), "upload tracker initialized");
    Ok(tracker)
}
