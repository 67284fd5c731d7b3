use std::path::Path;

use crate::pipeline::extract_frames_use_case::ExtractFramesUseCase;
use crate::sampling::domain::extraction_error::ExtractionError;
use crate::sampling::domain::frame_sampler::FrameSampler;
use crate::sampling::domain::sampling_request::{ExtractionResult, SamplingRequest};
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// [`FrameSampler`] backed by ffmpeg decoding and JPEG output.
///
/// Holds no decoder state: every call opens its own reader, so one instance
/// can be shared between requests.
#[derive(Clone, Debug)]
pub struct FfmpegFrameSampler {
    jpeg_quality: u8,
}

impl FfmpegFrameSampler {
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

impl Default for FfmpegFrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSampler for FfmpegFrameSampler {
    fn extract_frames(
        &self,
        source_path: &Path,
        output_dir: &Path,
        target_fps: f64,
    ) -> Result<ExtractionResult, ExtractionError> {
        let request = SamplingRequest::new(source_path, output_dir, target_fps)?;
        let mut use_case = ExtractFramesUseCase::new(
            Box::new(FfmpegReader::new()),
            Box::new(ImageFileWriter::new().with_jpeg_quality(self.jpeg_quality)),
            None,
        );
        use_case.execute(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::domain::sampling_interval::expected_sample_count;
    use crate::test_support::create_test_video;
    use std::fs;

    fn jpg_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".jpg"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_fifteen_frame_clip_at_one_fps_yields_single_frame() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("test.mp4");
        let frames_dir = dir.path().join("frames");
        create_test_video(&video, 15, 64, 48, 15);

        let result = FfmpegFrameSampler::new()
            .extract_frames(&video, &frames_dir, 1.0)
            .unwrap();

        assert_eq!(result.frame_count, 1);
        assert_eq!(result.output_dir, frames_dir);
        assert_eq!(jpg_files(&frames_dir), vec!["frame_0000.jpg"]);
    }

    #[test]
    fn test_count_matches_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("test.mp4");
        let frames_dir = dir.path().join("frames");
        create_test_video(&video, 20, 64, 48, 10);

        // 10 fps at 5 fps: interval 2 over 20 frames
        let result = FfmpegFrameSampler::new()
            .extract_frames(&video, &frames_dir, 5.0)
            .unwrap();

        assert_eq!(result.frame_count, expected_sample_count(20, 2));
        let files = jpg_files(&frames_dir);
        assert_eq!(files.len(), result.frame_count);
        for (i, name) in files.iter().enumerate() {
            assert_eq!(name, &format!("frame_{i:04}.jpg"));
        }
        let img = image::open(frames_dir.join("frame_0000.jpg")).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn test_high_target_rate_keeps_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("test.mp4");
        let frames_dir = dir.path().join("frames");
        create_test_video(&video, 5, 64, 48, 10);

        let result = FfmpegFrameSampler::new()
            .extract_frames(&video, &frames_dir, 100.0)
            .unwrap();
        assert_eq!(result.frame_count, 5);
    }

    #[test]
    fn test_non_video_is_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("notes.avi");
        fs::write(&bogus, b"definitely not a video").unwrap();

        let err = FfmpegFrameSampler::new()
            .extract_frames(&bogus, &dir.path().join("frames"), 1.0)
            .unwrap_err();
        assert!(err.is_source_error(), "{err}");
    }

    #[test]
    fn test_zero_byte_file_is_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        fs::write(&empty, b"").unwrap();

        let err = FfmpegFrameSampler::new()
            .extract_frames(&empty, &dir.path().join("frames"), 1.0)
            .unwrap_err();
        assert!(err.is_source_error(), "{err}");
    }

    #[test]
    fn test_invalid_rate_is_rejected_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let err = FfmpegFrameSampler::new()
            .extract_frames(&dir.path().join("missing.mp4"), dir.path(), 0.0)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidTargetFps(_)));
    }
}
