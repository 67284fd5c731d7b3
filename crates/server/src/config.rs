use std::path::PathBuf;

use framegrab_core::shared::constants::DEFAULT_TARGET_FPS;
use serde::{Deserialize, Serialize};

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_FRAMES_DIR: &str = "frames";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 512;

/// Directory layout and limits for the request handler.
///
/// Passed into [`AppState`](crate::AppState) at construction; nothing is
/// read from globals, so tests point it at temporary directories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Where uploads are staged before decoding.
    pub upload_dir: PathBuf,
    /// Shared output directory for sampled frames.
    pub frames_dir: PathBuf,
    /// Samples per second of source video.
    pub target_fps: f64,
    /// Request bodies larger than this are rejected.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn new(upload_dir: impl Into<PathBuf>, frames_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            frames_dir: frames_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_max_upload_mb(mut self, megabytes: usize) -> Self {
        self.max_upload_bytes = megabytes.saturating_mul(1024 * 1024);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            frames_dir: PathBuf::from(DEFAULT_FRAMES_DIR),
            target_fps: DEFAULT_TARGET_FPS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}
