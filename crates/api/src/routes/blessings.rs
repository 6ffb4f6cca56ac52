//! Route definitions for guest blessings.
//!
//! Mounted at `/blessing` by `api_routes()`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::blessings;
use crate::state::AppState;

/// ```text
/// POST   /send                  -> send
/// GET    /latest                -> latest
/// GET    /admin/list            -> admin_list
/// GET    /admin/stats           -> admin_stats
/// POST   /admin/{id}/approve    -> approve
/// DELETE /admin/{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(blessings::send))
        .route("/latest", get(blessings::latest))
        .route("/admin/list", get(blessings::admin_list))
        .route("/admin/stats", get(blessings::admin_stats))
        .route("/admin/{id}/approve", post(blessings::approve))
        .route("/admin/{id}", delete(blessings::delete))
}
