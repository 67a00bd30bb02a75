/// Upload orchestration for `POST /upload` and `POST /upload-thumbnail`
///
/// Per request: stage the chunk and/or thumbnail, then assemble and persist
/// once the tracker reports every declared chunk present.
///
/// Nothing here is transactional. A failure between assembly and the insert
/// leaves an assembled media file with no `videos` row, and two requests that
/// both observe the final chunk can both assemble the same upload.
/// Re-uploading an id that is already committed rewrites the live
/// `uploads/<id>.mp4` before the insert fails on the unique `file_id`, so the
/// existing row then serves the new bytes.
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use super::assembler::Assembler;
use crate::db::VideoRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{parse_paid_flag, NewVideo, VideoRecord};
use crate::storage::{ChunkStore, UploadId};
use crate::tracker::UploadTracker;

/// Files carried by one upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    ChunkOnly { index: u32, chunk: Bytes },
    ThumbnailOnly { thumbnail: Bytes },
    Both { index: u32, chunk: Bytes, thumbnail: Bytes },
    Neither,
}

impl UploadPayload {
    fn chunk(&self) -> Option<(u32, &Bytes)> {
        match self {
            Self::ChunkOnly { index, chunk } | Self::Both { index, chunk, .. } => {
                Some((*index, chunk))
            }
            _ => None,
        }
    }

    fn thumbnail(&self) -> Option<&Bytes> {
        match self {
            Self::ThumbnailOnly { thumbnail } | Self::Both { thumbnail, .. } => Some(thumbnail),
            _ => None,
        }
    }
}

/// Raw fields of an upload request as they arrive from the form
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file_id: Option<String>,
    pub chunk_index: Option<String>,
    pub total_chunks: Option<String>,
    pub paid_flag: Option<String>,
    pub chunk: Option<Bytes>,
    pub thumbnail: Option<Bytes>,
}

/// Validated upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCommand {
    pub upload_id: UploadId,
    pub total_chunks: Option<u32>,
    pub paid: bool,
    pub payload: UploadPayload,
}

impl TryFrom<UploadForm> for UploadCommand {
    type Error = AppError;

    fn try_from(form: UploadForm) -> Result<Self> {
        let upload_id = match form.file_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => UploadId::parse(raw)
                .map_err(|_| AppError::ValidationError("Invalid fileId".to_string()))?,
            _ => UploadId::generate(),
        };

        let payload = match (form.chunk, form.thumbnail) {
            (Some(chunk), thumbnail) => {
                let index = form
                    .chunk_index
                    .as_deref()
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .ok_or_else(|| {
                        AppError::ValidationError("Invalid or missing chunkIndex".to_string())
                    })?;
                match thumbnail {
                    Some(thumbnail) => UploadPayload::Both {
                        index,
                        chunk,
                        thumbnail,
                    },
                    None => UploadPayload::ChunkOnly { index, chunk },
                }
            }
            (None, Some(thumbnail)) => UploadPayload::ThumbnailOnly { thumbnail },
            (None, None) => UploadPayload::Neither,
        };

        // A missing, unparsable or zero total never completes an upload.
        let total_chunks = form
            .total_chunks
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|total| *total > 0);

        Ok(Self {
            upload_id,
            total_chunks,
            paid: parse_paid_flag(form.paid_flag.as_deref()),
            payload,
        })
    }
}

/// Result of handling one upload request
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// More chunks expected; the client resubmits against `upload_id`
    InProgress { upload_id: UploadId },
    /// Assembled and persisted
    Complete { video: VideoRecord },
}

#[derive(Clone)]
pub struct UploadService {
    chunks: ChunkStore,
    tracker: Arc<dyn UploadTracker>,
    assembler: Assembler,
    videos: Arc<dyn VideoRepository>,
}

impl UploadService {
    pub fn new(
        chunks: ChunkStore,
        tracker: Arc<dyn UploadTracker>,
        assembler: Assembler,
        videos: Arc<dyn VideoRepository>,
    ) -> Self {
        Self {
            chunks,
            tracker,
            assembler,
            videos,
        }
    }

    pub async fn handle(&self, command: UploadCommand) -> Result<UploadOutcome> {
        let UploadCommand {
            upload_id,
            total_chunks,
            paid,
            payload,
        } = command;

        if let Some((index, chunk)) = payload.chunk() {
            self.chunks.write_chunk(&upload_id, index, chunk).await?;
            self.tracker.record_chunk(&upload_id, index).await?;
            metrics::record_chunk_received();
        }

        let mut thumbnail_file = None;
        if let Some(thumbnail) = payload.thumbnail() {
            let name = self.chunks.write_thumbnail(&upload_id, thumbnail).await?;
            self.tracker.record_thumbnail(&upload_id, &name).await?;
            metrics::record_thumbnail_received();
            thumbnail_file = Some(name);
        }

        let complete = match total_chunks {
            Some(total) => self.tracker.is_complete(&upload_id, total).await?,
            None => false,
        };
        let total = match total_chunks {
            Some(total) if complete => total,
            _ => {
                debug!(
                    file_id = %upload_id,
                    total_chunks = ?total_chunks,
                    "upload waiting for more chunks"
                );
                return Ok(UploadOutcome::InProgress { upload_id });
            }
        };

        let assembled = self.assembler.assemble(&upload_id, total).await?;
        let new_video = NewVideo {
            file_id: upload_id.to_string(),
            file_path: assembled.media_file,
            thumbnail_path: assembled.thumbnail_file.or(thumbnail_file),
            paid,
        };

        let video = self
            .videos
            .insert(&new_video)
            .await
            .map_err(AppError::database("DB insert error"))?;

        info!(file_id = %upload_id, paid, "upload complete");
        Ok(UploadOutcome::Complete { video })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> UploadForm {
        UploadForm {
            file_id: Some("abc".into()),
            chunk_index: Some("0".into()),
            total_chunks: Some("2".into()),
            paid_flag: Some("true".into()),
            chunk: None,
            thumbnail: None,
        }
    }

    #[test]
    fn test_payload_variants() {
        let chunk = Bytes::from_static(b"c");
        let thumb = Bytes::from_static(b"t");

        let cmd = UploadCommand::try_from(UploadForm {
            chunk: Some(chunk.clone()),
            ..form()
        })
        .unwrap();
        assert_eq!(
            cmd.payload,
            UploadPayload::ChunkOnly {
                index: 0,
                chunk: chunk.clone()
            }
        );

        let cmd = UploadCommand::try_from(UploadForm {
            thumbnail: Some(thumb.clone()),
            ..form()
        })
        .unwrap();
        assert_eq!(cmd.payload, UploadPayload::ThumbnailOnly { thumbnail: thumb.clone() });

        let cmd = UploadCommand::try_from(UploadForm {
            chunk: Some(chunk.clone()),
            thumbnail: Some(thumb.clone()),
            ..form()
        })
        .unwrap();
        assert!(matches!(cmd.payload, UploadPayload::Both { index: 0, .. }));

        let cmd = UploadCommand::try_from(form()).unwrap();
        assert_eq!(cmd.payload, UploadPayload::Neither);
        assert!(cmd.paid);
        assert_eq!(cmd.total_chunks, Some(2));
    }

    #[test]
    fn test_chunk_without_index_is_rejected() {
        let result = UploadCommand::try_from(UploadForm {
            chunk_index: Some("first".into()),
            chunk: Some(Bytes::from_static(b"c")),
            ..form()
        });
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file_id_generates_one() {
        let cmd = UploadCommand::try_from(UploadForm {
            file_id: Some("  ".into()),
            ..form()
        })
        .unwrap();
        assert!(!cmd.upload_id.as_str().is_empty());
        assert_ne!(cmd.upload_id.as_str(), "abc");
    }

    #[test]
    fn test_invalid_file_id_is_rejected() {
        let result = UploadCommand::try_from(UploadForm {
            file_id: Some("../../etc".into()),
            ..form()
        });
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_zero_or_garbage_total_never_completes() {
        for raw in ["0", "-3", "many"] {
            let cmd = UploadCommand::try_from(UploadForm {
                total_chunks: Some(raw.into()),
                ..form()
            })
            .unwrap();
            assert_eq!(cmd.total_chunks, None, "{raw}");
        }
    }
}
