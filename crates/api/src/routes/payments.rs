//! Route definitions for payment accounts.
//!
//! Mounted at `/payment` by `api_routes()`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// ```text
/// POST   /                  -> create
/// GET    /list              -> list
/// GET    /frontend          -> frontend
/// GET    /global-message    -> get_global_message
/// POST   /global-message    -> save_global_message
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(payments::create))
        .route("/list", get(payments::list))
        .route("/frontend", get(payments::frontend))
        .route(
            "/global-message",
            get(payments::get_global_message).post(payments::save_global_message),
        )
        .route("/{id}", put(payments::update).delete(payments::delete))
}
