//! Route definitions for the site document.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::site_data;
use crate::state::AppState;

/// ```text
/// GET    /data              -> get_data
/// POST   /data              -> save_data
/// GET    /data/{section}    -> get_section
/// POST   /data/{section}    -> save_section
/// GET    /export            -> export
/// POST   /import            -> import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/data", get(site_data::get_data).post(site_data::save_data))
        .route(
            "/data/{section}",
            get(site_data::get_section).post(site_data::save_section),
        )
        .route("/export", get(site_data::export))
        .route("/import", post(site_data::import))
}
