//! Static site pages and uploaded images.

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::ServerConfig;
use crate::state::AppState;

/// ```text
/// /                 -> {site_root}/index.html
/// /admin, /admin/   -> {site_root}/admin.html
/// /uploads/*        -> {site_root}/public/images/*
/// anything else     -> {site_root}/*  (covers /admin/* and /public/*)
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    let root = &config.site_root;
    let admin_page = ServeFile::new(root.join("admin.html"));

    Router::new()
        .route_service("/", ServeFile::new(root.join("index.html")))
        .route_service("/admin", admin_page.clone())
        .route_service("/admin/", admin_page)
        .nest_service("/uploads", ServeDir::new(config.images_root()))
        .fallback_service(ServeDir::new(root))
}
