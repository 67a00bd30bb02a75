use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::UploadTracker;
use crate::error::{AppError, Result};
use crate::storage::UploadId;

const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Redis-backed tracker.
///
/// Keys:
/// - `upload:{id}`: set of received chunk indices
/// - `thumb:{id}`: thumbnail file name
///
/// Both keys are refreshed to the TTL on every write.
#[derive(Clone)]
pub struct RedisTracker {
    conn: SharedConnectionManager,
    ttl_seconds: u64,
}

impl RedisTracker {
    /// Initialize tracker from Redis client
    pub async fn new(client: redis::Client, ttl_seconds: Option<u64>) -> Result<Self> {
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to connect to Redis: {e}")))?;

        Ok(Self::with_manager(Arc::new(Mutex::new(manager)), ttl_seconds))
    }

    pub fn with_manager(manager: SharedConnectionManager, ttl_seconds: Option<u64>) -> Self {
        Self {
            conn: manager,
            ttl_seconds: ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS),
        }
    }

    fn chunks_key(upload_id: &UploadId) -> String {
        format!("upload:{upload_id}")
    }

    fn thumbnail_key(upload_id: &UploadId) -> String {
        format!("thumb:{upload_id}")
    }
}

#[async_trait]
impl UploadTracker for RedisTracker {
    async fn record_chunk(&self, upload_id: &UploadId, index: u32) -> Result<()> {
        let key = Self::chunks_key(upload_id);
        let mut conn = self.conn.lock().await;
        redis::pipe()
            .atomic()
            .sadd(&key, index)
            .ignore()
            .expire(&key, self.ttl_seconds as i64)
            .ignore()
            .query_async::<_, ()>(&mut *conn)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to record chunk: {e}")))
    }

    async fn record_thumbnail(&self, upload_id: &UploadId, thumbnail: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        conn.set_ex(Self::thumbnail_key(upload_id), thumbnail, self.ttl_seconds)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to record thumbnail: {e}")))
    }

    async fn thumbnail(&self, upload_id: &UploadId) -> Result<Option<String>> {
        let mut conn = self.conn.lock().await;
        conn.get(Self::thumbnail_key(upload_id))
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to read thumbnail: {e}")))
    }

    async fn received_count(&self, upload_id: &UploadId) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        conn.scard(Self::chunks_key(upload_id))
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to count chunks: {e}")))
    }

    async fn clear(&self, upload_id: &UploadId) -> Result<()> {
        let keys = vec![Self::chunks_key(upload_id), Self::thumbnail_key(upload_id)];
        let mut conn = self.conn.lock().await;
        conn.del(keys)
            .await
            .map(|_: usize| ())
            .map_err(|e| AppError::CacheError(format!("Failed to clear upload keys: {e}")))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
