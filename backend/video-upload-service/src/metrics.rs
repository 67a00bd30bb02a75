//! Prometheus metrics for chunked uploads
//!
//! Tracks received chunks/thumbnails, assembly outcomes and latency, and
//! mutations of stored videos.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Duration;

/// Total chunk payloads written to staging
static CHUNKS_RECEIVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "upload_chunks_received_total",
        "Total number of chunk payloads written to staging"
    )
    .expect("failed to register upload_chunks_received_total")
});

/// Total thumbnails received through the upload endpoints
static THUMBNAILS_RECEIVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "upload_thumbnails_received_total",
        "Total number of thumbnails received during uploads"
    )
    .expect("failed to register upload_thumbnails_received_total")
});

/// Assemblies by outcome (success/error)
static ASSEMBLIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "upload_assemblies_total",
        "Total number of chunk assemblies by outcome",
        &["status"]
    )
    .expect("failed to register upload_assemblies_total")
});

static ASSEMBLY_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "upload_assembly_duration_seconds",
        "Time spent concatenating chunks into the final media file",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("failed to register upload_assembly_duration_seconds")
});

/// Deletes and replacements of stored videos
static VIDEO_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "video_mutations_total",
        "Total number of video record mutations by operation",
        &["operation"]
    )
    .expect("failed to register video_mutations_total")
});

pub fn record_chunk_received() {
    CHUNKS_RECEIVED_TOTAL.inc();
}

pub fn record_thumbnail_received() {
    THUMBNAILS_RECEIVED_TOTAL.inc();
}

pub fn record_assembly(status: &str, duration: Duration) {
    ASSEMBLIES_TOTAL.with_label_values(&[status]).inc();
    ASSEMBLY_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_video_mutation(operation: &str) {
    VIDEO_MUTATIONS_TOTAL.with_label_values(&[operation]).inc();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// `GET /metrics`
pub async fn serve_metrics() -> HttpResponse {
    match render() {
        Ok(body) => HttpResponse::Ok()
            .content_type(TextEncoder::new().format_type())
            .body(body),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_series() {
        record_chunk_received();
        record_assembly("success", Duration::from_millis(5));

        let output = render().unwrap();
        assert!(output.contains("upload_chunks_received_total"));
        assert!(output.contains("upload_assemblies_total{status=\"success\"}"));
    }
}
