use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::Multipart;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::api_error::ApiError;
use crate::config::ServerConfig;

/// Name of the multipart field carrying the video.
pub const FILE_FIELD: &str = "file";

const FALLBACK_FILENAME: &str = "upload";

const MAX_STAGING_ATTEMPTS: usize = 1000;

/// An upload persisted to the staging directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Reduces a client-supplied filename to a safe single path component.
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`. Path separators and
/// whitespace become `_`, everything else is dropped, and leading or
/// trailing dots and underscores are trimmed so the result can never name
/// a parent directory or a hidden file.
pub fn secure_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => Some(c),
            '/' | '\\' => Some('_'),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let trimmed = mapped.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Finds the `file` field, validates its filename and streams it to disk.
///
/// Both working directories are created before any bytes are written. The
/// staged file is named `<id>-<sanitized>` with `id` drawn from `next_id`,
/// so two requests uploading the same filename never share a path.
pub async fn stage_upload(
    multipart: &mut Multipart,
    config: &ServerConfig,
    next_id: &AtomicU64,
) -> Result<StagedUpload, ApiError> {
    let mut field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) && field.file_name().is_some() => {
                break field
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Err(ApiError::MissingFile),
            Err(e) => {
                log::debug!("Unreadable multipart body: {e}");
                return Err(ApiError::MissingFile);
            }
        }
    };

    let client_name = field.file_name().unwrap_or_default().to_string();
    if client_name.is_empty() {
        return Err(ApiError::EmptyFilename);
    }

    ensure_dir(&config.upload_dir).await?;
    ensure_dir(&config.frames_dir).await?;

    let (path, mut file) =
        create_staging_file(&config.upload_dir, &secure_filename(&client_name), next_id).await?;

    let mut bytes = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(save_failed(&path))? {
        file.write_all(&chunk).await.map_err(save_failed(&path))?;
        bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(save_failed(&path))?;
    drop(file);

    log::info!(
        "Staged upload {client_name:?} as {} ({bytes} bytes)",
        path.display()
    );
    Ok(StagedUpload { path, bytes })
}

/// Creates a fresh file for `name`, skipping ids whose file already exists
/// (left behind by an earlier run of the server).
async fn create_staging_file(
    dir: &Path,
    name: &str,
    next_id: &AtomicU64,
) -> Result<(PathBuf, fs::File), ApiError> {
    for _ in 0..MAX_STAGING_ATTEMPTS {
        let id = next_id.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("{id}-{name}"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(save_failed(&path)(e)),
        }
    }
    log::error!("No free staging name for {name:?} in {}", dir.display());
    Err(ApiError::SaveFailed)
}

async fn ensure_dir(dir: &Path) -> Result<(), ApiError> {
    fs::create_dir_all(dir).await.map_err(save_failed(dir))
}

fn save_failed<E: Display>(path: &Path) -> impl FnOnce(E) -> ApiError + '_ {
    move |e| {
        log::error!("Failed to save upload to {}: {e}", path.display());
        ApiError::SaveFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("clip.mp4", "clip.mp4")]
    #[case("My Holiday Video.mov", "My_Holiday_Video.mov")]
    #[case("../../etc/passwd", "etc_passwd")]
    #[case("C:\\videos\\clip.avi", "C_videos_clip.avi")]
    #[case(".hidden.mp4", "hidden.mp4")]
    #[case("vidéo.mp4", "vido.mp4")]
    #[case("a-b_c.1.mkv", "a-b_c.1.mkv")]
    fn test_secure_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(secure_filename(input), expected);
    }

    #[rstest]
    #[case("..")]
    #[case("///")]
    #[case("日本語")]
    #[case("   ")]
    fn test_secure_filename_falls_back_when_nothing_survives(#[case] input: &str) {
        assert_eq!(secure_filename(input), "upload");
    }

    #[tokio::test]
    async fn test_staging_names_are_unique_per_upload() {
        let dir = tempfile::tempdir().unwrap();
        let next_id = AtomicU64::new(0);

        let (first, _) = create_staging_file(dir.path(), "clip.mp4", &next_id)
            .await
            .unwrap();
        let (second, _) = create_staging_file(dir.path(), "clip.mp4", &next_id)
            .await
            .unwrap();

        assert_eq!(first, dir.path().join("0-clip.mp4"));
        assert_eq!(second, dir.path().join("1-clip.mp4"));
    }

    #[tokio::test]
    async fn test_staging_skips_files_from_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0-clip.mp4"), b"old").unwrap();
        std::fs::write(dir.path().join("1-clip.mp4"), b"old").unwrap();
        let next_id = AtomicU64::new(0);

        let (path, _) = create_staging_file(dir.path(), "clip.mp4", &next_id)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("2-clip.mp4"));
        assert_eq!(std::fs::read(dir.path().join("0-clip.mp4")).unwrap(), b"old");
    }

    #[test]
    fn test_secure_filename_never_contains_separators() {
        for name in ["a/b/c.mp4", "..\\..\\x.mp4", "/abs/path.mp4"] {
            let safe = secure_filename(name);
            assert!(!safe.contains('/') && !safe.contains('\\'), "{safe}");
            assert!(!safe.starts_with('.'), "{safe}");
        }
    }
}
