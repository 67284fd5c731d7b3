use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{FRAME_FILE_EXTENSION, FRAME_FILE_PREFIX};

use super::extraction_error::ExtractionError;

/// Immutable input to one extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingRequest {
    source_path: PathBuf,
    output_dir: PathBuf,
    target_fps: f64,
}

impl SamplingRequest {
    /// Builds a request, rejecting a target rate that is not a positive,
    /// finite number.
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_fps: f64,
    ) -> Result<Self, ExtractionError> {
        if !(target_fps.is_finite() && target_fps > 0.0) {
            return Err(ExtractionError::InvalidTargetFps(target_fps));
        }
        Ok(Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            target_fps,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }
}

/// Outcome of a successful extraction run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub frame_count: usize,
    pub output_dir: PathBuf,
}

/// File name of the `sample_index`-th kept frame: `frame_0000.jpg`, ...
pub fn frame_file_name(sample_index: usize) -> String {
    format!("{FRAME_FILE_PREFIX}{sample_index:04}.{FRAME_FILE_EXTENSION}")
}
