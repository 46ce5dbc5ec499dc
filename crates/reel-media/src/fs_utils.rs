//! Filesystem utilities for publishing pipeline outputs.
//!
//! Intermediates are produced next to their destination, so a rename is the
//! usual path; `move_file` still handles the EXDEV case for media roots that
//! span mounts.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// This function first attempts a fast rename. If that fails with EXDEV
/// (cross-device link error), it falls back to copy-and-delete.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    ensure_parent(dst).await?;

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename detected, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_file(src, dst).await?;
            remove_file_best_effort(src).await;
            Ok(())
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Copy `src` to `dst` through a sibling temp file so `dst` is never left
/// half-written.
pub async fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    ensure_parent(dst).await?;

    let tmp_dst = partial_path(dst);

    fs::copy(src, &tmp_dst).await.map_err(|e| {
        tracing::error!(
            "Failed to copy file: {} -> {}: {}",
            src.display(),
            tmp_dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    fs::rename(&tmp_dst, dst).await.map_err(|e| {
        let _ = std::fs::remove_file(&tmp_dst);
        tracing::error!(
            "Failed to rename temp file: {} -> {}: {}",
            tmp_dst.display(),
            dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    Ok(())
}

/// Delete a file, logging instead of failing. Missing files are ignored.
pub async fn remove_file_best_effort(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed temporary file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove file {}: {}", path.display(), e),
    }
}

async fn ensure_parent(path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// `<name>.partial` next to `path`, keeping the original extension visible.
fn partial_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}
