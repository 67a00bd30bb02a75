/// Video management handlers
///
/// - GET /videos: paginated listing with optional paid filter
/// - DELETE /video/{fileId}
/// - PUT /video, PUT /thumbnail: replace the stored file
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use super::multipart::read_form;
use crate::error::{AppError, Result};
use crate::models::{ListVideosQuery, MessageResponse, ThumbnailUpdatedResponse, VideoUpdatedResponse};
use crate::AppState;

/// GET /videos
pub async fn list_videos(
    state: web::Data<AppState>,
    query: web::Query<ListVideosQuery>,
) -> Result<HttpResponse> {
    let response = state.videos.list(&query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /video/{fileId}
pub async fn delete_video(
    state: web::Data<AppState>,
    file_id: web::Path<String>,
) -> Result<HttpResponse> {
    state.videos.delete(&file_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Video and thumbnail deleted".to_string(),
    }))
}

/// PUT /video
pub async fn update_video(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let mut form = read_form(payload, &["video"], state.max_part_bytes).await?;
    let data = form
        .take_file("video")
        .ok_or_else(|| AppError::ValidationError("No video file provided".to_string()))?;
    let file_id = form.text("fileId").unwrap_or_default();

    let video = state.videos.replace_video(&file_id, data).await?;
    Ok(HttpResponse::Ok().json(VideoUpdatedResponse {
        message: "Video updated".to_string(),
        video,
    }))
}

/// PUT /thumbnail
pub async fn update_thumbnail(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_form(payload, &["thumbnail"], state.max_part_bytes).await?;
    let data = form
        .take_file("thumbnail")
        .ok_or_else(|| AppError::ValidationError("No thumbnail file provided".to_string()))?;
    let file_id = form.text("fileId").unwrap_or_default();

    let thumbnail = state.videos.replace_thumbnail(&file_id, data).await?;
    Ok(HttpResponse::Ok().json(ThumbnailUpdatedResponse {
        message: "Thumbnail updated".to_string(),
        thumbnail,
    }))
}

#[cfg(test)]
mod tests {
    use crate::db::VideoRepository;
    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{app_state, Form};
    use crate::models::NewVideo;
    use actix_web::{test, web, App};
    use serde_json::Value;

    fn new_video(file_id: &str, paid: bool) -> NewVideo {
        NewVideo {
            file_id: file_id.to_string(),
            file_path: format!("{file_id}.mp4"),
            thumbnail_path: None,
            paid,
        }
    }

    #[actix_web::test]
    async fn test_list_videos_filters_by_paid() {
        let (_tmp, state, repo) = app_state();
        for (id, paid) in [("a", true), ("b", false), ("c", true)] {
            repo.insert(&new_video(id, paid)).await.unwrap();
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/videos?paid=true&limit=1").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 1);
        assert_eq!(json["videos"].as_array().unwrap().len(), 1);
        assert_eq!(json["videos"][0]["fileId"], "c");
        assert_eq!(json["videos"][0]["paid_flag"], true);

        let req = test::TestRequest::get().uri("/videos?paid=maybe").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["total"], 3);
        assert_eq!(json["limit"], 10);
    }

    #[actix_web::test]
    async fn test_list_videos_page_past_end_is_empty() {
        let (_tmp, state, repo) = app_state();
        repo.insert(&new_video("only", false)).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/videos?page=9223372036854775807&limit=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["page"], i64::MAX);
        assert!(json["videos"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_list_videos_db_failure() {
        let (_tmp, state, repo) = app_state();
        repo.set_unavailable(true);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/videos").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "DB count error");
    }

    #[actix_web::test]
    async fn test_delete_unknown_video_is_404() {
        let (_tmp, state, _repo) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::delete().uri("/video/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Video not found");
        assert_eq!(json["code"], 404);
    }

    #[actix_web::test]
    async fn test_delete_existing_video() {
        let (_tmp, state, repo) = app_state();
        repo.insert(&new_video("gone", false)).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::delete().uri("/video/gone").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["message"], "Video and thumbnail deleted");
        assert!(repo.find("gone").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_update_video_requires_file() {
        let (_tmp, state, _repo) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let body = Form::new().text("fileId", "a");
        let resp = test::call_service(&app, body.put("/video").to_request()).await;
        assert_eq!(resp.status(), 400);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "No video file provided");
    }

    #[actix_web::test]
    async fn test_update_thumbnail_points_row_at_new_file() {
        let (tmp, state, repo) = app_state();
        repo.insert(&new_video("t1", false)).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let body = Form::new()
            .text("fileId", "t1")
            .file("thumbnail", "thumb.jpg", b"jpeg");
        let resp = test::call_service(&app, body.put("/thumbnail").to_request()).await;
        assert_eq!(resp.status(), 200);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["message"], "Thumbnail updated");
        let url = json["thumbnail"].as_str().unwrap();
        assert!(url.starts_with("/thumbnails/t1_thumb_updated_"));

        let row = repo.find("t1").await.unwrap().unwrap();
        let name = row.thumbnail_path.unwrap();
        assert!(tmp.path().join("thumbnails").join(name).exists());
    }

    #[actix_web::test]
    async fn test_update_unknown_file_id_still_succeeds() {
        let (_tmp, state, _repo) = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let body = Form::new()
            .text("fileId", "missing")
            .file("video", "v.mp4", b"video");
        let resp = test::call_service(&app, body.put("/video").to_request()).await;
        assert_eq!(resp.status(), 200);
    }
}
