use axum::routing::{get, post};
use axum::Router;

use crate::handlers::backups;
use crate::state::AppState;

/// ```text
/// GET    /backups                       -> list
/// POST   /backup/restore/{filename}     -> restore
/// POST   /backup/cleanup                -> cleanup
/// GET    /backup/stats                  -> stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/backups", get(backups::list))
        .route("/backup/restore/{filename}", post(backups::restore))
        .route("/backup/cleanup", post(backups::cleanup))
        .route("/backup/stats", get(backups::stats))
}
