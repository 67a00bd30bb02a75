/// Video repository - PostgreSQL operations on `videos`
use async_trait::async_trait;
use sqlx::PgPool;

use super::VideoRepository;
use crate::error::Result;
use crate::models::{paid_flag_value, NewVideo, PaidFilter, Pagination, VideoRecord};

#[derive(Debug, Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn insert(&self, video: &NewVideo) -> Result<VideoRecord> {
        let record = sqlx::query_as::<_, VideoRecord>(
            "INSERT INTO videos (file_id, file_path, thumbnail_path, paid_flag) \
             VALUES ($1, $2, $3, $4) \
             RETURNING file_id, file_path, thumbnail_path, paid_flag, created_at",
        )
        .bind(&video.file_id)
        .bind(&video.file_path)
        .bind(&video.thumbnail_path)
        .bind(paid_flag_value(video.paid))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn count(&self, filter: Option<PaidFilter>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM videos \
             WHERE ($1::SMALLINT IS NULL OR paid_flag = $1)",
        )
        .bind(filter.map(|f| f.flag_value()))
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn list(&self, filter: Option<PaidFilter>, page: Pagination) -> Result<Vec<VideoRecord>> {
        let videos = sqlx::query_as::<_, VideoRecord>(
            "SELECT file_id, file_path, thumbnail_path, paid_flag, created_at \
             FROM videos \
             WHERE ($1::SMALLINT IS NULL OR paid_flag = $1) \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(filter.map(|f| f.flag_value()))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn find(&self, file_id: &str) -> Result<Option<VideoRecord>> {
        let video = sqlx::query_as::<_, VideoRecord>(
            "SELECT file_id, file_path, thumbnail_path, paid_flag, created_at \
             FROM videos WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn delete(&self, file_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_file_path(&self, file_id: &str, file_path: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE videos SET file_path = $1 WHERE file_id = $2")
            .bind(file_path)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_thumbnail_path(&self, file_id: &str, thumbnail_path: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE videos SET thumbnail_path = $1 WHERE file_id = $2")
            .bind(thumbnail_path)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
