/// Data models for video-upload-service
///
/// This module defines structures for:
/// - VideoRecord: one completed upload as stored in `videos`
/// - Listing queries and responses
/// - Upload/update/delete response payloads
///
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::MediaKind;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 1000;

// ========================================
// Video Models
// ========================================

/// Video database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoRecord {
    pub file_id: String,
    /// File name relative to the uploads root
    pub file_path: String,
    /// File name relative to the thumbnails root
    pub thumbnail_path: Option<String>,
    /// 0 = free, 1 = paid
    pub paid_flag: i16,
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn is_paid(&self) -> bool {
        self.paid_flag == 1
    }
}

/// Row to insert once an upload has been assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub file_id: String,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub paid: bool,
}

/// Interpret the multipart `paid_flag` field. Only the literal `"true"` is paid.
pub fn parse_paid_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

pub fn paid_flag_value(paid: bool) -> i16 {
    if paid {
        1
    } else {
        0
    }
}

/// Public representation of a video
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub file_id: String,
    pub video: String,
    pub thumbnail: Option<String>,
    #[serde(rename = "paid_flag")]
    pub paid_flag: bool,
    pub created_at: DateTime<Utc>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(record: VideoRecord) -> Self {
        Self {
            paid_flag: record.is_paid(),
            video: MediaKind::Video.public_url(&record.file_path),
            thumbnail: record
                .thumbnail_path
                .as_deref()
                .map(|name| MediaKind::Thumbnail.public_url(name)),
            file_id: record.file_id,
            created_at: record.created_at,
        }
    }
}

// ========================================
// Listing
// ========================================

/// Optional restriction of a listing to paid or free videos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidFilter {
    Paid,
    Free,
}

impl PaidFilter {
    /// `"true"` and `"false"` filter; anything else (or nothing) lists everything
    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some("true") => Some(Self::Paid),
            Some("false") => Some(Self::Free),
            _ => None,
        }
    }

    pub fn flag_value(&self) -> i16 {
        match self {
            Self::Paid => 1,
            Self::Free => 0,
        }
    }

    pub fn matches(&self, record: &VideoRecord) -> bool {
        record.paid_flag == self.flag_value()
    }
}

/// Raw `GET /videos` query. Values stay strings so bad input falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVideosQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub paid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Rows to skip. Saturates, so a page past the end yields an empty page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl ListVideosQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: positive_or(self.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(self.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    pub fn paid_filter(&self) -> Option<PaidFilter> {
        PaidFilter::from_query(self.paid.as_deref())
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListVideosResponse {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub videos: Vec<VideoResponse>,
}

// ========================================
// Upload / mutation responses
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgressResponse {
    pub message: String,
    pub file_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompleteResponse {
    pub message: String,
    pub file_id: String,
    pub video: String,
    pub thumbnail: Option<String>,
    #[serde(rename = "paid_flag")]
    pub paid_flag: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoUpdatedResponse {
    pub message: String,
    pub video: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailUpdatedResponse {
    pub message: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
