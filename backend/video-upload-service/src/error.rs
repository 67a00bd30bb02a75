/// Error types for video-upload-service
///
/// Errors are converted to coarse JSON responses. Underlying causes are
/// logged, never returned to the client.
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    /// A tracker reported completion but a chunk file is missing
    #[error("Incomplete upload: {0}")]
    IncompleteUpload(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{context}: {detail}")]
    DatabaseError { context: &'static str, detail: String },

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a lower-level error as a database failure with a public message.
    ///
    /// ```ignore
    /// repo.insert(&video).await.map_err(AppError::database("DB insert error"))?;
    /// ```
    pub fn database(context: &'static str) -> impl FnOnce(AppError) -> AppError {
        move |err| match err {
            AppError::DatabaseError { detail, .. } => AppError::DatabaseError { context, detail },
            other => AppError::DatabaseError {
                context,
                detail: other.to_string(),
            },
        }
    }

    /// Message safe to hand back to API clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::IncompleteUpload(_) => "Upload incomplete".to_string(),
            AppError::Storage(_) => "Storage error".to_string(),
            AppError::DatabaseError { context, .. } => context.to_string(),
            AppError::CacheError(_) => "Upload tracker unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IncompleteUpload(_) => StatusCode::CONFLICT,
            AppError::Storage(_)
            | AppError::DatabaseError { .. }
            | AppError::CacheError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(ErrorResponse {
            message: self.public_message(),
            code: status.as_u16(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError {
            context: "Database error",
            detail: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(StorageError::Io(err))
    }
}
