use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use framegrab_core::sampling::domain::extraction_error::ExtractionError;
use serde::Serialize;
use thiserror::Error;

/// Every failure `/process` can report. The `Display` text is the
/// `message` field of the JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file provided")]
    MissingFile,
    #[error("Filename is empty")]
    EmptyFilename,
    #[error("Could not save upload")]
    SaveFailed,
    #[error("{0}")]
    CannotOpenVideo(String),
    #[error("{0}")]
    FrameExtractionFailed(String),
}

impl ApiError {
    /// Status code and machine-readable error code for each kind.
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
            ApiError::EmptyFilename => (StatusCode::BAD_REQUEST, "empty_filename"),
            ApiError::SaveFailed => (StatusCode::INTERNAL_SERVER_ERROR, "save_failed"),
            ApiError::CannotOpenVideo(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "cannot_open_video"),
            ApiError::FrameExtractionFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "frame_extraction_failed")
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().0
    }

    pub fn code(&self) -> &'static str {
        self.kind().1
    }
}

impl From<ExtractionError> for ApiError {
    fn from(error: ExtractionError) -> Self {
        if error.is_source_error() {
            ApiError::CannotOpenVideo(error.to_string())
        } else {
            ApiError::FrameExtractionFailed(error.to_string())
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.kind();
        if status.is_server_error() {
            log::error!("{code}: {self}");
        } else {
            log::warn!("{code}: {self}");
        }
        let body = ErrorBody {
            error: code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
