//! Image upload, listing and deletion under `public/images`.

use axum::body::Bytes;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wedding_core::error::CoreError;
use wedding_core::uploads::{
    self, secure_filename, validate_image_extension, OPTIMIZABLE_EXTENSIONS,
};
use wedding_db::models::upload::NewUpload;
use wedding_db::repositories::UploadRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{json_body, read_form, unix_secs, UploadedFile};
use crate::response::ApiResponse;
use crate::services::files;
use crate::state::AppState;

/// Details of a stored upload.
#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub filename: String,
    pub path: String,
    #[serde(rename = "type")]
    pub upload_type: String,
    pub size: i64,
}

/// Response of `POST /api/upload`, which carries the URL at the top level.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    pub data: StoredUpload,
}

/// Data returned by a background upload.
#[derive(Debug, Serialize)]
pub struct BackgroundUpload {
    pub url: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub upload_type: String,
}

/// Response of `POST /api/upload-image`.
#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    pub filename: String,
}

/// Response of `GET /api/list-files`.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub success: bool,
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    #[serde(rename = "type")]
    pub upload_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteBackgroundRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub section: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteFileRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(rename = "type")]
    pub upload_type: Option<String>,
}

/// Pull the `file` part out of a form, rejecting a missing part.
fn required_file(file: Option<UploadedFile>) -> AppResult<UploadedFile> {
    file.ok_or_else(|| AppError::BadRequest("No file selected".into()))
}

/// POST /api/upload
///
/// Multipart `file` plus `type`. Naming and directory follow
/// [`uploads::upload_filename`] and [`uploads::upload_dir`].
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut form = read_form(multipart, state.config.max_upload_bytes).await?;
    let file = required_file(form.take_file("file"))?;
    let upload_type = form
        .field("type")
        .filter(|t| !t.is_empty())
        .unwrap_or("general")
        .to_string();

    let ext = validate_image_extension(&file.filename)?;
    let filename = uploads::upload_filename(&upload_type, &file.filename, &ext, unix_secs());
    let dir = uploads::upload_dir(&upload_type);

    let images_root = state.config.images_root();
    let bytes = files::optimize(file.bytes, &ext).await?;
    let path = files::write_image(&images_root, dir, &filename, &bytes).await?;
    let size = bytes.len() as i64;
    let wants_thumbnail =
        upload_type == "gallery" && OPTIMIZABLE_EXTENSIONS.contains(&ext.as_str());

    let record = NewUpload {
        filename: filename.clone(),
        original_name: file.filename,
        file_path: path.to_string_lossy().to_string(),
        file_type: ext,
        file_size: size,
        upload_type: upload_type.clone(),
    };
    UploadRepo::create(&state.pool, &record).await?;

    if wants_thumbnail {
        files::write_thumbnail(&images_root, &filename, bytes).await;
    }

    let url = uploads::relative_url(dir, &filename);
    tracing::info!(filename = %filename, upload_type = %upload_type, size, "File uploaded");
    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully".into(),
        url: url.clone(),
        data: StoredUpload {
            filename,
            path: url,
            upload_type,
            size,
        },
    }))
}

/// POST /api/upload/background
///
/// Stores a section background, replacing `old_file` when given.
pub async fn upload_background(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<BackgroundUpload>>> {
    let mut form = read_form(multipart, state.config.max_upload_bytes).await?;
    let file = required_file(form.take_file("file"))?;
    let upload_type = form
        .field("type")
        .filter(|t| !t.is_empty())
        .unwrap_or("background")
        .to_string();
    let ext = validate_image_extension(&file.filename)?;

    let images_root = state.config.images_root();
    if let Some(old) = form.field("old_file").filter(|f| !f.is_empty()) {
        uploads::validate_plain_filename(old)?;
        let removed = files::remove_if_exists(&images_root.join("background").join(old)).await;
        match removed {
            Ok(true) => tracing::info!(filename = %old, "Old background removed"),
            Ok(false) => {}
            Err(e) => tracing::warn!(filename = %old, error = %e, "Failed to remove old background"),
        }
    }

    let filename = uploads::background_filename(&upload_type, &ext);
    let bytes = files::optimize(file.bytes, &ext).await?;
    files::write_image(&images_root, "background", &filename, &bytes).await?;

    tracing::info!(filename = %filename, upload_type = %upload_type, "Background uploaded");
    Ok(Json(ApiResponse::with_message(
        "Background uploaded successfully",
        BackgroundUpload {
            url: uploads::relative_url("background", &filename),
            filename,
            upload_type,
        },
    )))
}

/// DELETE /api/upload/background
///
/// A file that is already gone still counts as deleted.
pub async fn delete_background(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let input: DeleteBackgroundRequest = json_body(&body)?;
    if input.filename.is_empty() {
        return Err(AppError::BadRequest("No filename provided".into()));
    }
    uploads::validate_plain_filename(&input.filename)?;

    let path = state
        .config
        .images_root()
        .join("background")
        .join(&input.filename);
    if files::remove_if_exists(&path).await? {
        tracing::info!(filename = %input.filename, section = %input.section, "Background deleted");
        Ok(Json(ApiResponse::message(format!(
            "Deleted background file: {}",
            input.filename
        ))))
    } else {
        Ok(Json(ApiResponse::message(
            "File does not exist (it may already have been deleted)",
        )))
    }
}

/// POST /api/upload-image
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ImageUploadResponse>> {
    let mut form = read_form(multipart, state.config.max_upload_bytes).await?;
    let file = required_file(form.take_file("file"))?;
    let dir = uploads::image_dir(form.field("type").unwrap_or("general"));
    validate_image_extension(&file.filename)?;

    let safe = secure_filename(&file.filename);
    if safe.is_empty() {
        return Err(AppError::BadRequest("Invalid file name".into()));
    }
    let filename = format!("{}_{safe}", chrono::Utc::now().timestamp_millis());
    files::write_image(&state.config.images_root(), dir, &filename, &file.bytes).await?;

    tracing::info!(filename = %filename, dir, "Image uploaded");
    Ok(Json(ImageUploadResponse {
        success: true,
        message: "Image uploaded successfully".into(),
        url: uploads::absolute_url(dir, &filename),
        filename,
    }))
}

/// POST /api/delete-image
pub async fn delete_image(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let input: DeleteImageRequest = json_body(&body)?;
    if input.image_url.is_empty() {
        return Err(AppError::BadRequest("No image URL provided".into()));
    }

    let relative = uploads::resolve_image_url(&input.image_url)?;
    let path = state.config.images_root().join(&relative);
    if !files::remove_if_exists(&path).await? {
        return Err(CoreError::not_found("Image", &input.image_url).into());
    }

    tracing::info!(path = %relative.display(), "Image deleted");
    Ok(Json(ApiResponse::message("Image deleted successfully")))
}

/// GET /api/list-files?type=
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> AppResult<Json<FileListResponse>> {
    let dir = uploads::listing_dir(query.upload_type.as_deref().unwrap_or("general"));
    let files = files::list_file_names(&state.config.images_root().join(dir)).await?;
    Ok(Json(FileListResponse {
        success: true,
        files,
    }))
}

/// POST /api/delete-file
///
/// Removes the file and its `uploads` row. A missing file is not an error.
pub async fn delete_file(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let input: DeleteFileRequest = json_body(&body)?;
    if input.filename.is_empty() {
        return Err(AppError::BadRequest("No filename provided".into()));
    }
    uploads::validate_plain_filename(&input.filename)?;

    let dir = uploads::listing_dir(input.upload_type.as_deref().unwrap_or("general"));
    let path = state.config.images_root().join(dir).join(&input.filename);
    let existed = files::remove_if_exists(&path).await?;
    let rows = UploadRepo::delete_by_filename(&state.pool, &input.filename).await?;

    tracing::info!(filename = %input.filename, dir, existed, rows, "File deleted");
    Ok(Json(ApiResponse::message(format!(
        "Deleted file: {}",
        input.filename
    ))))
}
