//! Route definitions for ordered lists.
//!
//! Mounted at `/collections` by `api_routes()`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::collections;
use crate::state::AppState;

/// ```text
/// GET    /{collection}                -> list
/// POST   /{collection}                -> create
/// POST   /{collection}/reorder        -> reorder
/// PUT    /{collection}/{id}           -> update
/// DELETE /{collection}/{id}           -> delete
/// POST   /{collection}/{id}/move      -> move_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{collection}",
            get(collections::list).post(collections::create),
        )
        .route("/{collection}/reorder", post(collections::reorder))
        .route(
            "/{collection}/{id}",
            put(collections::update).delete(collections::delete),
        )
        .route("/{collection}/{id}/move", post(collections::move_item))
}
