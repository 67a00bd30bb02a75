pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod tracker;

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::db::VideoRepository;
use crate::services::{Assembler, UploadService, VideoService};
use crate::storage::{ChunkStore, MediaStore};
use crate::tracker::UploadTracker;

pub use config::Config;
pub use error::{AppError, Result};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService,
    pub videos: VideoService,
    pub media: MediaStore,
    pub max_part_bytes: usize,
}

impl AppState {
    pub fn new(
        storage: &StorageConfig,
        chunks: ChunkStore,
        tracker: Arc<dyn UploadTracker>,
        repo: Arc<dyn VideoRepository>,
    ) -> Self {
        let media = MediaStore::new(&storage.uploads_dir, &storage.thumbnails_dir);
        let assembler = Assembler::new(chunks.clone(), media.clone(), tracker.clone());

        Self {
            uploads: UploadService::new(chunks, tracker, assembler, repo.clone()),
            videos: VideoService::new(repo, media.clone()),
            media,
            max_part_bytes: storage.max_part_bytes,
        }
    }

    /// Chunk staging for the given storage roots
    pub fn chunk_store(storage: &StorageConfig) -> ChunkStore {
        ChunkStore::new(&storage.temp_dir, &storage.thumbnails_dir)
    }
}
