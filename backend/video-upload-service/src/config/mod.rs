/// Configuration management for video-upload-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

/// Filesystem roots for chunk staging and permanent media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub temp_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    #[serde(default = "default_max_part_bytes")]
    pub max_part_bytes: usize,
}

/// Which backend records received chunk indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerBackend {
    Directory,
    Redis,
    Memory,
}

impl TrackerBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" => Some(Self::Directory),
            "redis" => Some(Self::Redis),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub backend: TrackerBackend,
    pub redis_url: String,
    #[serde(default = "default_tracker_ttl_secs")]
    pub ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let tracker_name =
            std::env::var("UPLOAD_TRACKER").unwrap_or_else(|_| "directory".to_string());
        let backend = TrackerBackend::parse(&tracker_name)
            .ok_or_else(|| format!("Unknown UPLOAD_TRACKER backend: {tracker_name}"))?;

        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("UPLOAD_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("UPLOAD_SERVICE_PORT")
                    .unwrap_or_else(|_| "3001".to_string())
                    .parse()?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(
                    &std::env::var("CORS_ALLOWED_ORIGINS")
                        .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                ),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/videos".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                run_migrations: std::env::var("DATABASE_RUN_MIGRATIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_run_migrations),
            },
            storage: StorageConfig {
                temp_dir: std::env::var("STORAGE_TEMP_DIR")
                    .unwrap_or_else(|_| "temp".to_string())
                    .into(),
                uploads_dir: std::env::var("STORAGE_UPLOADS_DIR")
                    .unwrap_or_else(|_| "uploads".to_string())
                    .into(),
                thumbnails_dir: std::env::var("STORAGE_THUMBNAILS_DIR")
                    .unwrap_or_else(|_| "thumbnails".to_string())
                    .into(),
                max_part_bytes: std::env::var("UPLOAD_MAX_PART_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_part_bytes),
            },
            tracker: TrackerConfig {
                backend,
                redis_url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost".to_string()),
                ttl_secs: std::env::var("UPLOAD_TRACKER_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_tracker_ttl_secs),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn default_run_migrations() -> bool {
    true
}

fn default_max_part_bytes() -> usize {
    100 * 1024 * 1024 // 100 MiB
}

fn default_tracker_ttl_secs() -> u64 {
    3600 // 1 hour
}
