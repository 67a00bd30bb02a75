use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

use super::UploadTracker;
use crate::error::Result;
use crate::storage::UploadId;

#[derive(Debug, Default)]
struct SessionState {
    received: BTreeSet<u32>,
    thumbnail: Option<String>,
}

/// Process-local tracker. State is lost on restart and never expires.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    sessions: Mutex<HashMap<UploadId, SessionState>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads currently being tracked
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl UploadTracker for MemoryTracker {
    async fn record_chunk(&self, upload_id: &UploadId, index: u32) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(upload_id.clone())
            .or_default()
            .received
            .insert(index);
        Ok(())
    }

    async fn record_thumbnail(&self, upload_id: &UploadId, thumbnail: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(upload_id.clone()).or_default().thumbnail = Some(thumbnail.to_string());
        Ok(())
    }

    async fn thumbnail(&self, upload_id: &UploadId) -> Result<Option<String>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(upload_id).and_then(|s| s.thumbnail.clone()))
    }

    async fn received_count(&self, upload_id: &UploadId) -> Result<usize> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(upload_id).map_or(0, |s| s.received.len()))
    }

    async fn clear(&self, upload_id: &UploadId) -> Result<()> {
        self.sessions.lock().await.remove(upload_id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_index_does_not_increase_count() {
        let tracker = MemoryTracker::new();
        let id = UploadId::parse("mem").unwrap();

        tracker.record_chunk(&id, 0).await.unwrap();
        tracker.record_chunk(&id, 0).await.unwrap();
        tracker.record_chunk(&id, 1).await.unwrap();

        assert_eq!(tracker.received_count(&id).await.unwrap(), 2);
        assert!(tracker.is_complete(&id, 2).await.unwrap());
        assert!(!tracker.is_complete(&id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_thumbnail_last_write_wins_and_clear() {
        let tracker = MemoryTracker::new();
        let id = UploadId::parse("mem").unwrap();

        tracker.record_thumbnail(&id, "a.jpg").await.unwrap();
        tracker.record_thumbnail(&id, "b.jpg").await.unwrap();
        assert_eq!(tracker.thumbnail(&id).await.unwrap().as_deref(), Some("b.jpg"));
        assert_eq!(tracker.active_sessions().await, 1);

        tracker.clear(&id).await.unwrap();
        assert_eq!(tracker.thumbnail(&id).await.unwrap(), None);
        assert_eq!(tracker.received_count(&id).await.unwrap(), 0);
        assert_eq!(tracker.active_sessions().await, 0);
    }
}
