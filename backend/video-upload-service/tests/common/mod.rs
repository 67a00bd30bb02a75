//! Shared fixtures for integration tests

#![allow(dead_code)]

use actix_web::test::TestRequest;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use video_upload_service::config::StorageConfig;
use video_upload_service::db::InMemoryVideoRepository;
use video_upload_service::tracker::{MemoryTracker, UploadTracker};
use video_upload_service::AppState;

const BOUNDARY: &str = "----integration-boundary";

pub struct TestEnv {
    pub tmp: TempDir,
    pub storage: StorageConfig,
    pub repo: Arc<InMemoryVideoRepository>,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let storage = StorageConfig {
            temp_dir: tmp.path().join("temp"),
            uploads_dir: tmp.path().join("uploads"),
            thumbnails_dir: tmp.path().join("thumbnails"),
            max_part_bytes: 4 * 1024 * 1024,
        };
        Self {
            tmp,
            storage,
            repo: Arc::new(InMemoryVideoRepository::new()),
        }
    }

    /// State using an in-process tracker
    pub fn state(&self) -> AppState {
        let tracker: Arc<dyn UploadTracker> = Arc::new(MemoryTracker::new());
        self.state_with(tracker)
    }

    pub fn state_with(&self, tracker: Arc<dyn UploadTracker>) -> AppState {
        AppState::new(
            &self.storage,
            AppState::chunk_store(&self.storage),
            tracker,
            self.repo.clone(),
        )
    }

    pub fn uploads(&self) -> PathBuf {
        self.storage.uploads_dir.clone()
    }

    pub fn thumbnails(&self) -> PathBuf {
        self.storage.thumbnails_dir.clone()
    }

    pub fn temp(&self) -> PathBuf {
        self.storage.temp_dir.clone()
    }
}

/// Hand-built `multipart/form-data` body, same builder as the in-crate handler tests use
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(self, req: TestRequest, uri: &str) -> TestRequest {
        let mut body = self.body;
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        req.uri(uri)
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    pub fn post(self, uri: &str) -> TestRequest {
        self.finish(TestRequest::post(), uri)
    }

    pub fn put(self, uri: &str) -> TestRequest {
        self.finish(TestRequest::put(), uri)
    }
}
