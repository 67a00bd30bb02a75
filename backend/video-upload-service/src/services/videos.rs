/// Listing, deletion and replacement of stored videos
use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::VideoRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{ListVideosQuery, ListVideosResponse, VideoResponse};
use crate::storage::{MediaKind, MediaStore, UploadId};

#[derive(Clone)]
pub struct VideoService {
    videos: Arc<dyn VideoRepository>,
    media: MediaStore,
}

impl VideoService {
    pub fn new(videos: Arc<dyn VideoRepository>, media: MediaStore) -> Self {
        Self { videos, media }
    }

    pub async fn list(&self, query: &ListVideosQuery) -> Result<ListVideosResponse> {
        let filter = query.paid_filter();
        let page = query.pagination();

        let total = self
            .videos
            .count(filter)
            .await
            .map_err(AppError::database("DB count error"))?;
        let rows = self
            .videos
            .list(filter, page)
            .await
            .map_err(AppError::database("DB fetch error"))?;

        Ok(ListVideosResponse {
            total,
            page: page.page,
            limit: page.limit,
            videos: rows.into_iter().map(VideoResponse::from).collect(),
        })
    }

    /// Remove a video, its thumbnail and its row.
    ///
    /// Missing files are skipped; other file errors are logged and the row is
    /// deleted anyway.
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let video = match self.videos.find(file_id).await {
            Ok(Some(video)) => video,
            Ok(None) => return Err(AppError::NotFound("Video not found".to_string())),
            Err(e) => {
                warn!(file_id, "video lookup failed before delete: {}", e);
                return Err(AppError::NotFound("Video not found".to_string()));
            }
        };

        if let Err(e) = self.media.remove(MediaKind::Video, &video.file_path).await {
            warn!(file_id, file = %video.file_path, "failed to remove video file: {}", e);
        }
        if let Some(thumbnail) = video.thumbnail_path.as_deref() {
            if let Err(e) = self.media.remove(MediaKind::Thumbnail, thumbnail).await {
                warn!(file_id, file = %thumbnail, "failed to remove thumbnail file: {}", e);
            }
        }

        self.videos
            .delete(file_id)
            .await
            .map_err(AppError::database("Delete failed"))?;

        metrics::record_video_mutation("delete");
        info!(file_id, "video deleted");
        Ok(())
    }

    /// Store a new video file for `file_id` and point the row at it.
    /// Returns the public URL of the new file.
    pub async fn replace_video(&self, file_id: &str, data: Bytes) -> Result<String> {
        let file_id = checked_file_id(file_id)?;
        let name = self.media.write_replacement_video(file_id.as_str(), &data).await?;

        let updated = self
            .videos
            .update_file_path(file_id.as_str(), &name)
            .await
            .map_err(AppError::database("DB update failed"))?;
        if !updated {
            warn!(file_id = %file_id, "video replaced for unknown fileId");
        }

        metrics::record_video_mutation("replace_video");
        info!(file_id = %file_id, file = %name, "video replaced");
        Ok(MediaKind::Video.public_url(&name))
    }

    /// Store a new thumbnail for `file_id` and point the row at it.
    pub async fn replace_thumbnail(&self, file_id: &str, data: Bytes) -> Result<String> {
        let file_id = checked_file_id(file_id)?;
        let name = self
            .media
            .write_replacement_thumbnail(file_id.as_str(), &data)
            .await?;

        let updated = self
            .videos
            .update_thumbnail_path(file_id.as_str(), &name)
            .await
            .map_err(AppError::database("DB update failed"))?;
        if !updated {
            warn!(file_id = %file_id, "thumbnail replaced for unknown fileId");
        }

        metrics::record_video_mutation("replace_thumbnail");
        info!(file_id = %file_id, file = %name, "thumbnail replaced");
        Ok(MediaKind::Thumbnail.public_url(&name))
    }
}

fn checked_file_id(raw: &str) -> Result<UploadId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::ValidationError("fileId is required".to_string()));
    }
    UploadId::parse(raw).map_err(|_| AppError::ValidationError("Invalid fileId".to_string()))
}
