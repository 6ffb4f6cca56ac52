//! Image files under the site's `public/images` directory.

use std::path::{Path, PathBuf};

use wedding_core::imaging;
use wedding_core::uploads::OPTIMIZABLE_EXTENSIONS;

use crate::error::{AppError, AppResult};

/// Write `bytes` to `{images_root}/{dir}/{filename}`, creating the directory.
pub async fn write_image(
    images_root: &Path,
    dir: &str,
    filename: &str,
    bytes: &[u8],
) -> AppResult<PathBuf> {
    let target_dir = images_root.join(dir);
    tokio::fs::create_dir_all(&target_dir).await?;
    let path = target_dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Delete a file. Returns `false` when it did not exist.
pub async fn remove_if_exists(path: &Path) -> AppResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Optimize an upload on the blocking pool.
///
/// Extensions outside [`OPTIMIZABLE_EXTENSIONS`] pass through untouched; an
/// image that fails to optimize is logged and kept as uploaded.
pub async fn optimize(bytes: Vec<u8>, ext: &str) -> AppResult<Vec<u8>> {
    if !OPTIMIZABLE_EXTENSIONS.contains(&ext) {
        return Ok(bytes);
    }
    let ext_owned = ext.to_string();
    let result = tokio::task::spawn_blocking(move || {
        let optimized = imaging::optimize(&bytes, &ext_owned);
        (bytes, optimized)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Image task failed: {e}")))?;

    match result {
        (_, Ok(optimized)) => Ok(optimized),
        (original, Err(e)) => {
            tracing::warn!(error = %e, ext, "Image optimization failed, keeping original");
            Ok(original)
        }
    }
}

/// Build and store a gallery thumbnail. Failures are logged only.
pub async fn write_thumbnail(images_root: &Path, filename: &str, bytes: Vec<u8>) {
    let thumb = tokio::task::spawn_blocking(move || imaging::thumbnail(&bytes)).await;
    match thumb {
        Ok(Ok(data)) => match write_image(images_root, "thumbs", filename, &data).await {
            Ok(path) => tracing::info!(path = %path.display(), "Thumbnail created"),
            Err(e) => tracing::warn!(error = %e, filename, "Failed to write thumbnail"),
        },
        Ok(Err(e)) => tracing::warn!(error = %e, filename, "Thumbnail generation failed"),
        Err(e) => tracing::warn!(error = %e, filename, "Thumbnail task failed"),
    }
}

/// Sorted file names directly inside `dir`. A missing directory lists as
/// empty.
pub async fn list_file_names(dir: &Path) -> AppResult<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}
