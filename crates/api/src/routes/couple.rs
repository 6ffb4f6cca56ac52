use axum::routing::get;
use axum::Router;

use crate::handlers::couple;
use crate::state::AppState;

/// Mounted at `/couple`.
///
/// ```text
/// GET    /info    -> info
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/info", get(couple::info))
}
