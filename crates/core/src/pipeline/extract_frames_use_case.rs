use std::fs;

use crate::sampling::domain::extraction_error::ExtractionError;
use crate::sampling::domain::sampling_interval::{
    effective_native_fps, is_sampled, sampling_interval,
};
use crate::sampling::domain::sampling_request::{
    frame_file_name, ExtractionResult, SamplingRequest,
};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Progress callback: `(frames_decoded, frames_saved)`.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send>;

/// Walks a video's decoded frames and persists every Nth one.
///
/// The stride comes from the source's native rate and the requested target
/// rate. Kept frames are numbered by their position among kept frames, not
/// among source frames, so the output is always `frame_0000.jpg` through
/// `frame_{count-1}.jpg` with no gaps.
///
/// The reader is closed on every exit path. Frames already written before a
/// failure are left in place.
pub struct ExtractFramesUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    on_progress: Option<ProgressFn>,
}

impl ExtractFramesUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        on_progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            on_progress,
        }
    }

    pub fn execute(
        &mut self,
        request: &SamplingRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let output_dir = request.output_dir();
        fs::create_dir_all(output_dir).map_err(|source| ExtractionError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let metadata = match self.reader.open(request.source_path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.reader.close();
                return Err(ExtractionError::CannotOpenSource {
                    path: request.source_path().to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let result = self.sample(&metadata, request);
        self.reader.close();
        result
    }

    fn sample(
        &mut self,
        metadata: &VideoMetadata,
        request: &SamplingRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let native_fps = effective_native_fps(metadata.fps);
        if native_fps != metadata.fps {
            log::warn!(
                "{}: frame rate unknown ({}), assuming {native_fps} fps",
                request.source_path().display(),
                metadata.fps
            );
        }
        let interval = sampling_interval(metadata.fps, request.target_fps());
        log::info!(
            "Sampling {} at {} fps (native {native_fps:.3} fps, ~{} frames, every {interval} frames)",
            request.source_path().display(),
            request.target_fps(),
            metadata.total_frames
        );

        let output_dir = request.output_dir();
        let mut decoded = 0usize;
        let mut saved = 0usize;

        for frame in self.reader.frames() {
            let frame = frame.map_err(|e| ExtractionError::Decode(e.to_string()))?;
            decoded += 1;

            if is_sampled(frame.index(), interval) {
                let path = output_dir.join(frame_file_name(saved));
                self.image_writer
                    .write(&path, &frame)
                    .map_err(|e| ExtractionError::WriteFrame {
                        reason: e.to_string(),
                        path,
                    })?;
                saved += 1;
            }

            if let Some(ref callback) = self.on_progress {
                callback(decoded, saved);
            }
        }

        log::info!(
            "Extracted {saved} of {decoded} frames into {}",
            output_dir.display()
        );

        Ok(ExtractionResult {
            frame_count: saved,
            output_dir: output_dir.to_path_buf(),
        })
    }
}
