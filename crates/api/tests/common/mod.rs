#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use wedding_api::config::{CoupleDefaults, ServerConfig};
use wedding_api::router::build_app_router;
use wedding_api::state::AppState;
use wedding_events::EventBus;

/// Upload limit used by the test config; small so oversize cases stay cheap.
pub const TEST_MAX_UPLOAD_BYTES: usize = 256 * 1024;

/// Build a test `ServerConfig` rooted at `site_root`.
///
/// Backups go to `{site_root}/backups`; CORS allows any origin.
pub fn test_config(site_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        site_root: site_root.to_path_buf(),
        backup_dir: site_root.join("backups"),
        max_backups: 5,
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        telegram_api_base: "http://127.0.0.1:9".to_string(),
        couple_defaults: CoupleDefaults {
            groom_name: "Groom".to_string(),
            bride_name: "Bride".to_string(),
            contact_email: "couple@example.com".to_string(),
        },
    }
}

/// A fresh site directory holding the two HTML pages.
pub fn test_site() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<h1>wedding</h1>").unwrap();
    std::fs::write(dir.path().join("admin.html"), "<h1>admin</h1>").unwrap();
    test_config(dir.path()).ensure_directories().unwrap();
    dir
}

/// Build the full application router, using the given database pool and
/// config, through the same builder `main.rs` uses.
pub fn build_app(pool: SqlitePool, config: ServerConfig, event_bus: Arc<EventBus>) -> Router {
    let state = AppState::new(pool, config.clone(), event_bus);
    build_app_router(state, &config)
}

/// Build the app over a fresh temporary site. The `TempDir` must outlive
/// the router.
pub fn build_test_app(pool: SqlitePool) -> (Router, TempDir) {
    let site = test_site();
    let app = build_app(
        pool,
        test_config(site.path()),
        Arc::new(EventBus::default()),
    );
    (app, site)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn with_json(
    app: Router,
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    with_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    with_json(app, Method::PUT, uri, body).await
}

pub async fn delete_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    with_json(app, Method::DELETE, uri, body).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body is JSON")
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "----wedding-test-boundary";

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: Method, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub async fn post_multipart(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    send(app, form.into_request(Method::POST, uri)).await
}

/// A small solid-colour PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 90]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
