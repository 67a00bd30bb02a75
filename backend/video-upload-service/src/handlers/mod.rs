//! HTTP handlers for video-upload-service

pub mod files;
pub mod multipart;
pub mod uploads;
pub mod videos;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::metrics;

pub use files::{serve_thumbnail, serve_upload};
pub use uploads::{upload, upload_thumbnail};
pub use videos::{delete_video, list_videos, update_thumbnail, update_video};

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Configure routes for the upload service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/upload", web::post().to(upload))
        .route("/upload-thumbnail", web::post().to(upload_thumbnail))
        .route("/videos", web::get().to(list_videos))
        .route("/video/{file_id}", web::delete().to(delete_video))
        .route("/video", web::put().to(update_video))
        .route("/thumbnail", web::put().to(update_thumbnail))
        .route("/uploads/{name}", web::get().to(serve_upload))
        .route("/thumbnails/{name}", web::get().to(serve_thumbnail));
}
