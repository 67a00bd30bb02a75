use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_upload_service::db::{PgVideoRepository, MIGRATOR};
use video_upload_service::handlers;
use video_upload_service::storage::MediaStore;
use video_upload_service::{tracker, AppState, Config};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.is_production());

    tracing::info!("Starting video-upload-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database: {e}")))?;

    if config.database.run_migrations {
        MIGRATOR
            .run(&db_pool)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migrations: {e}")))?;
        tracing::info!("Database migrations applied");
    }

    let media = MediaStore::new(&config.storage.uploads_dir, &config.storage.thumbnails_dir);
    media
        .ensure_dirs()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("storage: {e}")))?;
    tokio::fs::create_dir_all(&config.storage.temp_dir).await?;

    let chunks = AppState::chunk_store(&config.storage);
    let tracker = tracker::from_config(&config.tracker, chunks.clone())
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("tracker: {e}")))?;

    let state = web::Data::new(AppState::new(
        &config.storage,
        chunks,
        tracker,
        Arc::new(PgVideoRepository::new(db_pool)),
    ));

    let bind_address = config.bind_address();
    tracing::info!("Listening on {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
