/// Database access layer
///
/// This module provides:
/// - `VideoRepository`: the persistence contract for the `videos` table
/// - `PgVideoRepository`: PostgreSQL implementation over a `PgPool`
/// - `InMemoryVideoRepository`: process-local implementation for local runs and tests
pub mod memory;
pub mod video_repo;

pub use memory::InMemoryVideoRepository;
pub use video_repo::PgVideoRepository;

use async_trait::async_trait;
use sqlx::migrate::Migrator;

use crate::error::Result;
use crate::models::{NewVideo, PaidFilter, Pagination, VideoRecord};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert the record for a freshly assembled upload
    async fn insert(&self, video: &NewVideo) -> Result<VideoRecord>;

    /// Number of videos matching the filter
    async fn count(&self, filter: Option<PaidFilter>) -> Result<i64>;

    /// One page of videos, newest first
    async fn list(&self, filter: Option<PaidFilter>, page: Pagination) -> Result<Vec<VideoRecord>>;

    async fn find(&self, file_id: &str) -> Result<Option<VideoRecord>>;

    /// Returns false when no row matched
    async fn delete(&self, file_id: &str) -> Result<bool>;

    async fn update_file_path(&self, file_id: &str, file_path: &str) -> Result<bool>;

    async fn update_thumbnail_path(&self, file_id: &str, thumbnail_path: &str) -> Result<bool>;
}
