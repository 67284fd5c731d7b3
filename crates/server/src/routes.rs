use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use framegrab_core::sampling::domain::extraction_error::ExtractionError;
use framegrab_core::sampling::domain::frame_sampler::FrameSampler;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::api_error::ApiError;
use crate::config::ServerConfig;
use crate::upload::stage_upload;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    sampler: Arc<dyn FrameSampler>,
    // All requests write into the same frames directory, so extractions
    // run one at a time. The guard travels with the blocking job so a
    // dropped request cannot release it early.
    extraction_lock: Arc<Mutex<()>>,
    upload_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: ServerConfig, sampler: Arc<dyn FrameSampler>) -> Self {
        Self {
            config: Arc::new(config),
            sampler,
            extraction_lock: Arc::new(Mutex::new(())),
            upload_seq: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub message: &'static str,
    pub frame_count: usize,
    pub frames_dir: String,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn process(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        log::debug!("Rejected non-multipart request: {rejection}");
        ApiError::MissingFile
    })?;

    let upload = stage_upload(&mut multipart, &state.config, &state.upload_seq).await?;

    let guard = Arc::clone(&state.extraction_lock).lock_owned().await;
    let sampler = Arc::clone(&state.sampler);
    let frames_dir = state.config.frames_dir.clone();
    let target_fps = state.config.target_fps;
    let source = upload.path.clone();

    let result = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        sampler.extract_frames(&source, &frames_dir, target_fps)
    })
    .await
    .map_err(|e| ExtractionError::Worker(e.to_string()))??;

    log::info!(
        "Extracted {} frames from {} ({} bytes) into {}",
        result.frame_count,
        upload.path.display(),
        upload.bytes,
        result.output_dir.display()
    );

    Ok(Json(ProcessResponse {
        message: "Processing complete",
        frame_count: result.frame_count,
        frames_dir: result.output_dir.display().to_string(),
    }))
}
