//! Handlers for the ordered lists inside the site document.
//!
//! `/collections/{collection}` where `collection` is `slides`, `story` or
//! `gallery`. Every mutation rewrites the owning section immediately.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};
use wedding_core::collections::{self, Collection, MoveTarget};
use wedding_core::error::CoreError;
use wedding_core::site_data::{SiteDocument, SECTION_LEGACY_DATA};

use crate::error::AppResult;
use crate::handlers::{json_body, json_object};
use crate::response::ApiResponse;
use crate::services::document;
use crate::state::AppState;

/// Body of a drag-and-drop reorder.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

/// Load the document, let `f` edit the collection's items, then persist the
/// owning section. Returns whatever `f` returned alongside the final list.
async fn mutate<T>(
    state: &AppState,
    collection: Collection,
    f: impl FnOnce(&mut Vec<Value>) -> Result<T, CoreError>,
) -> AppResult<(T, Vec<Value>)> {
    let _guard = state.write_lock.lock().await;

    let mut doc: SiteDocument = document::load(&state.pool).await?;
    let mut items = collection.items(&doc);
    let out = f(&mut items)?;
    collection.store(&mut doc, items.clone());

    let section = collection.section();
    let value = doc.remove(section).unwrap_or(Value::Null);
    let mut sections = vec![(section, value)];
    // Loading folds a legacy `data.story` into `story`; `data` is stored
    // without it.
    if collection == Collection::Story {
        if let Some(data) = doc.remove(SECTION_LEGACY_DATA) {
            sections.push((SECTION_LEGACY_DATA, data));
        }
    }
    document::save_sections(&state.pool, sections).await?;
    Ok((out, items))
}

/// GET /api/collections/{collection}
pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let doc = document::load(&state.pool).await?;
    Ok(Json(ApiResponse::ok(collection.items(&doc))))
}

/// POST /api/collections/{collection}
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<Value>>)> {
    let fields = json_object(&body)?;
    let now_millis = chrono::Utc::now().timestamp_millis();

    let (item, _) = mutate(&state, collection, |items| {
        collections::append(collection, items, fields, now_millis)
    })
    .await?;

    tracing::info!(collection = ?collection, id = ?item.get("id"), "Item added");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Item added", item)),
    ))
}

/// PUT /api/collections/{collection}/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Value>>> {
    let patch: Map<String, Value> = json_object(&body)?;

    let (item, _) = mutate(&state, collection, |items| {
        collections::update(collection, items, &id, patch)
    })
    .await?;

    tracing::info!(collection = ?collection, id = %id, "Item updated");
    Ok(Json(ApiResponse::with_message("Item updated", item)))
}

/// DELETE /api/collections/{collection}/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let (removed, _) = mutate(&state, collection, |items| {
        collections::remove(collection, items, &id)
    })
    .await?;

    tracing::info!(collection = ?collection, id = %id, "Item deleted");
    Ok(Json(ApiResponse::with_message("Item deleted", removed)))
}

/// POST /api/collections/{collection}/{id}/move
///
/// Body `{"direction": "up"|"down"}` or `{"position": n}` (1-based).
/// Responds with the reordered list.
pub async fn move_item(
    State(state): State<AppState>,
    Path((collection, id)): Path<(Collection, String)>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let target: MoveTarget = json_body(&body)?;

    let (index, items) = mutate(&state, collection, |items| {
        collections::move_item(collection, items, &id, target)
    })
    .await?;

    tracing::info!(collection = ?collection, id = %id, index, "Item moved");
    Ok(Json(ApiResponse::with_message(
        format!("Item moved to position {}", index + 1),
        items,
    )))
}

/// POST /api/collections/{collection}/reorder
///
/// Body `{"from": i, "to": j}` with zero-based indices.
pub async fn reorder(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let request: ReorderRequest = json_body(&body)?;

    let ((), items) = mutate(&state, collection, |items| {
        collections::reorder(items, request.from, request.to)
    })
    .await?;

    tracing::info!(collection = ?collection, from = request.from, to = request.to, "Items reordered");
    Ok(Json(ApiResponse::with_message("Items reordered", items)))
}
