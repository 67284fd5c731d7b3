//! HTTP front end for frame sampling.
//!
//! `GET /health` reports liveness. `POST /process` accepts a multipart
//! upload in the `file` field, stages it, samples frames into the shared
//! frames directory and reports how many were written.

pub mod api_error;
pub mod config;
pub mod routes;
pub mod upload;

pub use api_error::ApiError;
pub use config::ServerConfig;
pub use routes::{build_router, AppState};
