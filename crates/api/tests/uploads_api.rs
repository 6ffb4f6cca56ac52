//! Integration tests for image upload, listing and deletion.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_json, get, png_bytes, post_json, post_multipart, MultipartForm};
use serde_json::json;
use sqlx::SqlitePool;
use wedding_db::repositories::UploadRepo;

#[sqlx::test(migrations = "../db/migrations")]
async fn gallery_upload_is_stored_recorded_and_thumbnailed(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool.clone());

    let form = MultipartForm::new()
        .text("type", "gallery")
        .file("file", "Our Photo.PNG", &png_bytes(40, 20));
    let response = post_multipart(app, "/api/upload", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let filename = json["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("gallery_") && filename.ends_with(".png"));
    assert_eq!(json["url"], format!("./public/images/gallery/{filename}"));
    assert_eq!(json["data"]["path"], json["url"]);
    assert_eq!(json["data"]["type"], "gallery");

    let images = site.path().join("public/images");
    assert!(images.join("gallery").join(&filename).is_file());
    let thumb = image::open(images.join("thumbs").join(&filename)).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (300, 300));

    let rows = UploadRepo::list(&pool, Some("gallery")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].original_name, "Our Photo.PNG");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn gallery_gif_is_stored_without_thumbnail(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool);

    let form = MultipartForm::new()
        .text("type", "gallery")
        .file("file", "dance.gif", &png_bytes(40, 20));
    let response = post_multipart(app, "/api/upload", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let filename = body_json(response).await["data"]["filename"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(filename.ends_with(".gif"));

    let images = site.path().join("public/images");
    assert!(images.join("gallery").join(&filename).is_file());
    assert!(!images.join("thumbs").join(&filename).exists());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn couple_portrait_uses_fixed_name(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool);

    let form = MultipartForm::new()
        .text("type", "groom")
        .file("file", "me.jpg", &png_bytes(4, 4));
    let json = body_json(post_multipart(app, "/api/upload", form).await).await;

    assert_eq!(json["url"], "./public/images/couple/groom_image.jpg");
    assert!(site.path().join("public/images/couple/groom_image.jpg").is_file());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_rejects_bad_extension_and_oversize(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);

    let form = MultipartForm::new().file("file", "script.exe", b"MZ");
    let response = post_multipart(app.clone(), "/api/upload", form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing = post_multipart(app.clone(), "/api/upload", MultipartForm::new().text("type", "story")).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let big = vec![0u8; common::TEST_MAX_UPLOAD_BYTES + 1];
    let form = MultipartForm::new().file("file", "huge.png", &big);
    let response = post_multipart(app, "/api/upload", form).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn background_upload_replaces_old_file(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool);
    let background = site.path().join("public/images/background");
    std::fs::write(background.join("old.png"), b"old").unwrap();

    let form = MultipartForm::new()
        .text("type", "story-background")
        .text("old_file", "old.png")
        .file("file", "bg.png", &png_bytes(8, 8));
    let response = post_multipart(app.clone(), "/api/upload/background", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let filename = json["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("story-background_"));
    assert_eq!(json["data"]["type"], "story-background");
    assert_eq!(json["data"]["url"], format!("./public/images/background/{filename}"));
    assert!(!background.join("old.png").exists());
    assert!(background.join(&filename).is_file());

    let deleted = delete_json(
        app.clone(),
        "/api/upload/background",
        &json!({"filename": filename, "section": "story"}),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(!background.join(&filename).exists());

    let again = delete_json(
        app,
        "/api/upload/background",
        &json!({"filename": filename, "section": "story"}),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK, "missing file is still success");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn simple_image_upload_and_delete_by_url(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool);

    let form = MultipartForm::new()
        .text("type", "story")
        .file("file", "first date.webp", b"RIFF....WEBP");
    let json = body_json(post_multipart(app.clone(), "/api/upload-image", form).await).await;
    let filename = json["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("_first_date.webp"));
    assert_eq!(json["url"], format!("/public/images/story/{filename}"));
    assert!(site.path().join("public/images/story").join(&filename).is_file());

    let deleted = post_json(app.clone(), "/api/delete-image", &json!({"imageUrl": json["url"]})).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let again = post_json(app.clone(), "/api/delete-image", &json!({"imageUrl": json["url"]})).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let escape = post_json(
        app,
        "/api/delete-image",
        &json!({"imageUrl": "/public/images/../../index.html"}),
    )
    .await;
    assert_eq!(escape.status(), StatusCode::BAD_REQUEST);
    assert!(site.path().join("index.html").is_file());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_and_delete_files(pool: SqlitePool) {
    let (app, site) = common::build_test_app(pool.clone());
    let form = MultipartForm::new()
        .text("type", "banner")
        .file("file", "hero.png", &png_bytes(4, 4));
    let json = body_json(post_multipart(app.clone(), "/api/upload", form).await).await;
    let filename = json["data"]["filename"].as_str().unwrap().to_string();
    std::fs::remove_dir_all(site.path().join("public/images/couple")).unwrap();

    let listed = body_json(get(app.clone(), "/api/list-files?type=banner").await).await;
    assert_eq!(listed["files"], json!([filename]));

    let missing_dir = body_json(get(app.clone(), "/api/list-files?type=couple").await).await;
    assert_eq!(missing_dir["files"], json!([]));

    let deleted = post_json(
        app.clone(),
        "/api/delete-file",
        &json!({"filename": filename, "type": "banner"}),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(UploadRepo::list(&pool, None).await.unwrap().is_empty());

    let listed = body_json(get(app.clone(), "/api/list-files?type=banner").await).await;
    assert_eq!(listed["files"], json!([]));

    let gone = post_json(
        app,
        "/api/delete-file",
        &json!({"filename": "never-there.png", "type": "banner"}),
    )
    .await;
    assert_eq!(gone.status(), StatusCode::OK);
}
