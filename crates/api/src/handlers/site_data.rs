//! Handlers for the site document: `/data`, `/export`, `/import`.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde_json::Value;
use wedding_core::error::CoreError;
use wedding_core::site_data::{self, SiteDocument};
use wedding_db::repositories::SiteDataRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{json_object, read_form};
use crate::response::ApiResponse;
use crate::services::{backup, document};
use crate::state::AppState;

/// GET /api/data
pub async fn get_data(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SiteDocument>>> {
    let doc = document::load(&state.pool).await?;
    Ok(Json(ApiResponse::with_message("Data loaded", doc)))
}

/// POST /api/data
///
/// Merges the posted document into the stored one according to
/// [`site_data::merge_for_save`], after taking a backup.
pub async fn save_data(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let incoming = json_object(&body)?;
    let strategy = site_data::classify_save(&incoming);

    let _guard = state.write_lock.lock().await;
    backup::before_write(&state, "save site data").await;

    let current = document::load(&state.pool).await?;
    let merged = site_data::merge_for_save(current, incoming);
    document::save_all(&state.pool, merged).await?;

    tracing::info!(strategy = ?strategy, "Site data saved");
    Ok(Json(ApiResponse::message("Data saved successfully")))
}

/// GET /api/data/{section}
pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let row = SiteDataRepo::find(&state.pool, &section)
        .await?
        .ok_or_else(|| CoreError::not_found("Section", &section))?;

    let (value, err) = site_data::parse_section(&row.value);
    if let Some(e) = err {
        tracing::error!(section = %section, error = %e, "Stored section is not valid JSON");
    }
    Ok(Json(ApiResponse::with_message(
        format!("Section {section} loaded"),
        value,
    )))
}

/// POST /api/data/{section}
///
/// Replaces one section wholesale.
pub async fn save_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No data provided".into()));
    }
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?;
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(AppError::BadRequest("No data provided".into()));
    }

    let _guard = state.write_lock.lock().await;
    document::save_section(&state.pool, &section, value).await?;
    Ok(Json(ApiResponse::message(format!("Section {section} updated"))))
}

/// GET /api/export
///
/// The loaded document without the response envelope.
pub async fn export(State(state): State<AppState>) -> AppResult<Json<SiteDocument>> {
    let doc = document::load(&state.pool).await?;
    tracing::info!(sections = doc.len(), "Site data exported");
    Ok(Json(doc))
}

/// POST /api/import
///
/// Multipart `file` holding an exported document. Every section in the file
/// is upserted after a backup; sections absent from the file are kept.
pub async fn import(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut form = read_form(multipart, state.config.max_upload_bytes).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("No file selected".into()))?;

    if !file.filename.to_ascii_lowercase().ends_with(".json") {
        return Err(AppError::BadRequest("File must be a JSON document".into()));
    }

    let doc = match serde_json::from_slice::<Value>(&file.bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(AppError::BadRequest("Import file must hold a JSON object".into())),
        Err(_) => return Err(AppError::BadRequest("Invalid JSON file".into())),
    };

    let _guard = state.write_lock.lock().await;
    backup::before_write(&state, "import").await;
    let sections = doc.len();
    document::save_all(&state.pool, doc).await?;

    tracing::info!(filename = %file.filename, sections, "Site data imported");
    Ok(Json(ApiResponse::message("Data imported successfully")))
}
