/// Chunked upload handlers
///
/// - POST /upload: chunk and/or thumbnail for an upload session
/// - POST /upload-thumbnail: thumbnail only, same session protocol
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use super::multipart::{read_form, FormParts};
use crate::error::Result;
use crate::models::{UploadCompleteResponse, UploadProgressResponse, VideoResponse};
use crate::services::{UploadCommand, UploadForm, UploadOutcome};
use crate::AppState;

const CHUNK_FIELD: &str = "chunk";
const THUMBNAIL_FIELD: &str = "thumbnail";

fn upload_form(mut parts: FormParts) -> UploadForm {
    UploadForm {
        file_id: parts.text("fileId"),
        chunk_index: parts.text("chunkIndex"),
        total_chunks: parts.text("totalChunks"),
        paid_flag: parts.text("paid_flag"),
        chunk: parts.take_file(CHUNK_FIELD),
        thumbnail: parts.take_file(THUMBNAIL_FIELD),
    }
}

async fn handle_upload(
    state: &AppState,
    payload: Multipart,
    file_fields: &[&str],
) -> Result<HttpResponse> {
    let parts = read_form(payload, file_fields, state.max_part_bytes).await?;
    let command = UploadCommand::try_from(upload_form(parts))?;

    let response = match state.uploads.handle(command).await? {
        UploadOutcome::InProgress { upload_id } => HttpResponse::Ok().json(UploadProgressResponse {
            message: "Chunk or thumbnail uploaded, waiting for more".to_string(),
            file_id: upload_id.to_string(),
        }),
        UploadOutcome::Complete { video } => {
            let video = VideoResponse::from(video);
            HttpResponse::Ok().json(UploadCompleteResponse {
                message: "Upload complete".to_string(),
                file_id: video.file_id,
                video: video.video,
                thumbnail: video.thumbnail,
                paid_flag: video.paid_flag,
            })
        }
    };

    Ok(response)
}

/// POST /upload
pub async fn upload(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    handle_upload(&state, payload, &[CHUNK_FIELD, THUMBNAIL_FIELD]).await
}

/// POST /upload-thumbnail
pub async fn upload_thumbnail(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    handle_upload(&state, payload, &[THUMBNAIL_FIELD]).await
}
