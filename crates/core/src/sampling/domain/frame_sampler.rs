use std::path::Path;

use super::extraction_error::ExtractionError;
use super::sampling_request::ExtractionResult;

/// Samples frames from a video file into a directory of numbered images.
///
/// The request handler depends on this trait rather than on ffmpeg so it
/// can be exercised with a stub.
pub trait FrameSampler: Send + Sync {
    /// Writes every Nth decoded frame of `source_path` into `output_dir`
    /// (created if missing) so that roughly `target_fps` frames are kept
    /// per second of source video.
    fn extract_frames(
        &self,
        source_path: &Path,
        output_dir: &Path,
        target_fps: f64,
    ) -> Result<ExtractionResult, ExtractionError>;
}
