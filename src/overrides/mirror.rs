//! Mirror mode: seed local overrides from origin responses.
//!
//! On a fallback with mirroring enabled, the buffered origin body is written
//! to the resolved local path so the next request finds a local file to
//! edit. The write is best-effort: it runs on a detached task, failures are
//! logged and swallowed, and the client response is never delayed or failed
//! by it.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

/// Persist `body` at `local_path` without blocking the response.
pub fn spawn_persist(local_path: PathBuf, body: Bytes) {
    tokio::spawn(async move {
        match persist(&local_path, &body).await {
            Ok(()) => {
                tracing::info!(path = %local_path.display(), bytes = body.len(), "mirrored origin file");
            }
            Err(error) => {
                tracing::warn!(path = %local_path.display(), %error, "mirror write failed");
            }
        }
    });
}

/// Write atomically: temp file in the target directory, then rename.
/// Concurrent requests mirroring the same path race with last-writer-wins
/// semantics, but a reader never observes partially written bytes.
pub async fn persist(local_path: &Path, body: &[u8]) -> std::io::Result<()> {
    let parent = local_path.parent().unwrap_or(Path::new("."));
    tokio::fs::create_dir_all(parent).await?;

    let file_name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("mirror");
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    tokio::fs::write(&temp_path, body).await?;
    match tokio::fs::rename(&temp_path, local_path).await {
        Ok(()) => Ok(()),
        Err(error) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(error)
        }
    }
}
