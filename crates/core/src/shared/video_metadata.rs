use std::path::PathBuf;

/// Stream properties reported when a video source is opened.
///
/// `fps` is whatever the container/codec claims and may be `0.0` when the
/// rate is unknown; callers apply their own fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count hint from the container. `0` when unknown.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}
