//! Integration tests for the site document endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, post_json, post_multipart, MultipartForm};
use serde_json::json;
use sqlx::SqlitePool;
use wedding_api::services::document;
use wedding_db::repositories::{BackupRepo, SiteDataRepo};

#[sqlx::test(migrations = "../db/migrations")]
async fn get_data_returns_seeded_and_normalized_document(pool: SqlitePool) {
    document::seed(&pool).await.unwrap();
    let (app, _site) = common::build_test_app(pool);

    let response = get(app, "/api/data").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["meta"]["title"], "Wedding Website");
    assert_eq!(json["data"]["admin"]["version"], "2.0.0");
    assert_eq!(json["data"]["payment"], json!({"global_message": "", "payments": []}));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn save_data_deep_merges_and_replaces_lists(pool: SqlitePool) {
    SiteDataRepo::upsert(
        &pool,
        "hero",
        r#"{"groomName":"A","brideName":"B","slides":[{"id":"banner-1"},{"id":"banner-2"}]}"#,
    )
    .await
    .unwrap();
    SiteDataRepo::upsert(&pool, "story", r#"[{"id":"story-1"},{"id":"story-2"}]"#)
        .await
        .unwrap();
    let (app, _site) = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/api/data",
        &json!({
            "hero": {"groomName": "Minh", "slides": [{"id": "banner-2"}]},
            "story": [{"id": "story-2"}],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, "/api/data").await).await;
    assert_eq!(json["data"]["hero"]["groomName"], "Minh");
    assert_eq!(json["data"]["hero"]["brideName"], "B");
    assert_eq!(json["data"]["hero"]["slides"], json!([{"id": "banner-2"}]));
    assert_eq!(json["data"]["story"], json!([{"id": "story-2"}]));

    // A backup was taken before the write.
    assert_eq!(BackupRepo::totals(&pool).await.unwrap().total_backups, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn save_data_rejects_empty_body(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);
    let response = post_json(app, "/api/data", &json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No data provided");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn visibility_save_only_touches_visibility(pool: SqlitePool) {
    SiteDataRepo::upsert(&pool, "visibility", r#"{"gallery":true,"story":true}"#)
        .await
        .unwrap();
    SiteDataRepo::upsert(&pool, "meta", r#"{"title":"Kept"}"#)
        .await
        .unwrap();
    let (app, _site) = common::build_test_app(pool);

    post_json(app.clone(), "/api/data", &json!({"visibility": {"gallery": false}})).await;

    let json = body_json(get(app, "/api/data").await).await;
    assert_eq!(json["data"]["visibility"], json!({"gallery": false}));
    assert_eq!(json["data"]["meta"]["title"], "Kept");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn section_endpoints(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);

    let missing = get(app.clone(), "/api/data/theme").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let saved = post_json(app.clone(), "/api/data/theme", &json!({"color": "red"})).await;
    assert_eq!(saved.status(), StatusCode::OK);

    let json = body_json(get(app.clone(), "/api/data/theme").await).await;
    assert_eq!(json["data"], json!({"color": "red"}));

    let empty = post_json(app, "/api/data/theme", &json!({})).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn export_then_import(pool: SqlitePool) {
    document::seed(&pool).await.unwrap();
    let (app, _site) = common::build_test_app(pool);

    let exported = body_json(get(app.clone(), "/api/export").await).await;
    assert!(exported.get("success").is_none(), "export is not enveloped");
    assert_eq!(exported["hero"]["groomName"], "Groom");

    let mut doc = exported.clone();
    doc["hero"]["groomName"] = json!("Imported");
    let form = MultipartForm::new().file("file", "backup.json", doc.to_string().as_bytes());
    let response = post_multipart(app.clone(), "/api/import", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app.clone(), "/api/data/hero").await).await;
    assert_eq!(json["data"]["groomName"], "Imported");

    let bad = MultipartForm::new().file("file", "broken.json", b"{not json");
    let response = post_multipart(app.clone(), "/api/import", bad).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid JSON file");

    let wrong_ext = MultipartForm::new().file("file", "data.txt", b"{}");
    let response = common::send(app, wrong_ext.into_request(Method::POST, "/api/import")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
