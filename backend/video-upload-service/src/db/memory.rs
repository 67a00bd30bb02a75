use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::VideoRepository;
use crate::error::{AppError, Result};
use crate::models::{paid_flag_value, NewVideo, PaidFilter, Pagination, VideoRecord};

/// `VideoRepository` kept in process memory.
///
/// `set_unavailable(true)` makes every call fail like a lost database
/// connection.
#[derive(Debug, Default)]
pub struct InMemoryVideoRepository {
    rows: RwLock<Vec<VideoRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError {
                context: "Database error",
                detail: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    /// Rows matching the filter, newest first. Ties keep the most recent insert first.
    fn newest_first<'a>(
        rows: &'a [VideoRecord],
        filter: Option<PaidFilter>,
    ) -> Vec<&'a VideoRecord> {
        let mut matching: Vec<&VideoRecord> = rows
            .iter()
            .rev()
            .filter(|row| filter.map_or(true, |f| f.matches(row)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn insert(&self, video: &NewVideo) -> Result<VideoRecord> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.file_id == video.file_id) {
            return Err(AppError::DatabaseError {
                context: "Database error",
                detail: format!("duplicate key value violates unique constraint: {}", video.file_id),
            });
        }

        let record = VideoRecord {
            file_id: video.file_id.clone(),
            file_path: video.file_path.clone(),
            thumbnail_path: video.thumbnail_path.clone(),
            paid_flag: paid_flag_value(video.paid),
            created_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn count(&self, filter: Option<PaidFilter>) -> Result<i64> {
        self.check_available()?;
        let rows = self.rows.read().await;
        Ok(Self::newest_first(&rows, filter).len() as i64)
    }

    async fn list(&self, filter: Option<PaidFilter>, page: Pagination) -> Result<Vec<VideoRecord>> {
        self.check_available()?;
        let rows = self.rows.read().await;
        Ok(Self::newest_first(&rows, filter)
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn find(&self, file_id: &str) -> Result<Option<VideoRecord>> {
        self.check_available()?;
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.file_id == file_id).cloned())
    }

    async fn delete(&self, file_id: &str) -> Result<bool> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.file_id != file_id);
        Ok(rows.len() != before)
    }

    async fn update_file_path(&self, file_id: &str, file_path: &str) -> Result<bool> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|row| row.file_id == file_id)
            .map(|row| row.file_path = file_path.to_string())
            .is_some())
    }

    async fn update_thumbnail_path(&self, file_id: &str, thumbnail_path: &str) -> Result<bool> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|row| row.file_id == file_id)
            .map(|row| row.thumbnail_path = Some(thumbnail_path.to_string()))
            .is_some())
    }
}
