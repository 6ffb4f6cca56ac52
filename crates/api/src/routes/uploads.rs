//! Route definitions for image files.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// ```text
/// POST   /upload                -> upload
/// POST   /upload/background     -> upload_background
/// DELETE /upload/background     -> delete_background
/// POST   /upload-image          -> upload_image
/// POST   /delete-image          -> delete_image
/// GET    /list-files            -> list_files
/// POST   /delete-file           -> delete_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(uploads::upload))
        .route(
            "/upload/background",
            post(uploads::upload_background).delete(uploads::delete_background),
        )
        .route("/upload-image", post(uploads::upload_image))
        .route("/delete-image", post(uploads::delete_image))
        .route("/list-files", get(uploads::list_files))
        .route("/delete-file", post(uploads::delete_file))
}
