/// Business logic layer for video-upload-service
///
/// - `upload`: per-request chunk/thumbnail staging and completion
/// - `assembler`: concatenation of staged chunks
/// - `videos`: listing, deletion and replacement
pub mod assembler;
pub mod upload;
pub mod videos;

pub use assembler::{AssembledUpload, Assembler};
pub use upload::{UploadCommand, UploadForm, UploadOutcome, UploadPayload, UploadService};
pub use videos::VideoService;
