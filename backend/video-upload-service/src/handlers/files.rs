//! Static media serving for `/uploads/{name}` and `/thumbnails/{name}`

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use std::io::ErrorKind;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::storage::{MediaKind, StorageError};
use crate::AppState;

async fn serve(state: &AppState, kind: MediaKind, name: &str) -> Result<HttpResponse> {
    let path = state.media.resolve(kind, name).map_err(|e| match e {
        StorageError::InvalidFileName(_) => AppError::NotFound("File not found".to_string()),
        other => other.into(),
    })?;

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    let mut response = HttpResponse::Ok();
    response.content_type(mime.essence_str());

    // Videos play in the browser instead of downloading.
    if kind == MediaKind::Video {
        response.insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(name.to_string())],
        });
    }

    Ok(response.streaming(ReaderStream::new(file)))
}

/// GET /uploads/{name}
pub async fn serve_upload(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    serve(&state, MediaKind::Video, &name).await
}

/// GET /thumbnails/{name}
pub async fn serve_thumbnail(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    serve(&state, MediaKind::Thumbnail, &name).await
}
