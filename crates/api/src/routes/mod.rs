pub mod backups;
pub mod blessings;
pub mod collections;
pub mod couple;
pub mod health;
pub mod payments;
pub mod site_data;
pub mod site_pages;
pub mod telegram;
pub mod uploads;

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          service and database status
///
/// /data                                            load, save with merge
/// /data/{section}                                  get, replace one section
/// /export                                          download the document
/// /import                                          upload a document (multipart)
///
/// /collections/{collection}                        list, append
/// /collections/{collection}/reorder                move by index (POST)
/// /collections/{collection}/{id}                   update, delete
/// /collections/{collection}/{id}/move              move up/down or to a position (POST)
///
/// /upload                                          image upload by type (multipart)
/// /upload/background                               upload, delete a section background
/// /upload-image                                    simple image upload (multipart)
/// /delete-image                                    delete by public URL (POST)
/// /list-files                                      file names by type (GET)
/// /delete-file                                     delete by name and type (POST)
///
/// /backups                                         list snapshots
/// /backup/restore/{filename}                       restore a snapshot (POST)
/// /backup/cleanup                                  apply retention (POST)
/// /backup/stats                                    catalogue totals
///
/// /blessing/send                                   guest submission (POST)
/// /blessing/latest                                 public wall
/// /blessing/admin/list                             paged moderation list
/// /blessing/admin/stats                            moderation counters
/// /blessing/admin/{id}/approve                     approve or hide (POST)
/// /blessing/admin/{id}                             delete
///
/// /telegram/config                                 get, save
///
/// /payment                                         create (JSON or multipart)
/// /payment/list                                    all accounts, sorted
/// /payment/frontend                                active accounts for the site
/// /payment/global-message                          get, save
/// /payment/{id}                                    update, delete
///
/// /couple/info                                     footer details
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(site_data::router())
        .nest("/collections", collections::router())
        .merge(uploads::router())
        .merge(backups::router())
        .nest("/blessing", blessings::router())
        .nest("/telegram", telegram::router())
        .nest("/payment", payments::router())
        .nest("/couple", couple::router())
        .fallback(api_not_found)
}

/// Unknown `/api/*` paths answer with the JSON error envelope.
async fn api_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("API endpoint {} not found", uri.path()),
            "code": "NOT_FOUND",
        })),
    )
}
