/// Native rate assumed when the decoder reports none (common for some
/// containers).
pub const FALLBACK_FPS: f64 = 30.0;

/// Samples per second of source video when the caller does not choose.
pub const DEFAULT_TARGET_FPS: f64 = 1.0;

pub const FRAME_FILE_PREFIX: &str = "frame_";
pub const FRAME_FILE_EXTENSION: &str = "jpg";

pub const DEFAULT_JPEG_QUALITY: u8 = 95;
