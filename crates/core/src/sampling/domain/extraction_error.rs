use std::path::PathBuf;

use thiserror::Error;

/// Failures of a frame extraction run.
///
/// Only [`CannotOpenSource`](ExtractionError::CannotOpenSource) describes bad
/// input media; every other variant is an internal fault for the caller.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("target fps must be a positive number, got {0}")]
    InvalidTargetFps(f64),
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot open video: {path}: {reason}")]
    CannotOpenSource { path: PathBuf, reason: String },
    #[error("failed to decode video: {0}")]
    Decode(String),
    #[error("failed to write frame {path}: {reason}")]
    WriteFrame { path: PathBuf, reason: String },
    #[error("extraction worker failed: {0}")]
    Worker(String),
}

impl ExtractionError {
    /// True when the source media itself is unusable (unsupported or
    /// corrupt input rather than a server-side fault).
    pub fn is_source_error(&self) -> bool {
        matches!(self, ExtractionError::CannotOpenSource { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_open_message_carries_path() {
        let err = ExtractionError::CannotOpenSource {
            path: PathBuf::from("uploads/clip.avi"),
            reason: "Invalid data found when processing input".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Cannot open video: uploads/clip.avi"), "{msg}");
        assert!(err.is_source_error());
    }

    #[test]
    fn test_other_variants_are_not_source_errors() {
        assert!(!ExtractionError::Decode("boom".into()).is_source_error());
        assert!(!ExtractionError::InvalidTargetFps(0.0).is_source_error());
        assert!(!ExtractionError::WriteFrame {
            path: PathBuf::from("frames/frame_0000.jpg"),
            reason: "disk full".into(),
        }
        .is_source_error());
    }

    #[test]
    fn test_output_dir_error_exposes_source() {
        use std::error::Error as _;
        let err = ExtractionError::OutputDir {
            path: PathBuf::from("/ro/frames"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.source().is_some());
    }
}
