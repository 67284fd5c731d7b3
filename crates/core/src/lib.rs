//! Frame sampling for uploaded videos.
//!
//! Decodes a video with ffmpeg, keeps every Nth frame according to a target
//! sampling rate, and writes the kept frames as numbered JPEG files.

pub mod pipeline;
pub mod sampling;
pub mod shared;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod video;
