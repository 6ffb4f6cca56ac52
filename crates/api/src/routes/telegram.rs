use axum::routing::get;
use axum::Router;

use crate::handlers::telegram;
use crate::state::AppState;

/// Mounted at `/telegram`.
///
/// ```text
/// GET    /config    -> get_config
/// POST   /config    -> save_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/config",
        get(telegram::get_config).post(telegram::save_config),
    )
}
