//! Integration tests for guest blessings and their Telegram notification.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::{body_json, delete, get, post_json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use wedding_events::{EventBus, TelegramDelivery, TelegramNotifier};

async fn send_blessing(app: Router, name: &str, content: &str) -> i64 {
    let response = post_json(
        app,
        "/api/blessing/send",
        &json!({"name": name, "from": "Friend", "content": content}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["blessing_id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn send_requires_every_field(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/blessing/send",
        &json!({"name": "An", "from": "  ", "content": "Hi"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Field from is required");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn moderation_flow(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);

    let first = send_blessing(app.clone(), "An", "Happy wedding").await;
    let second = send_blessing(app.clone(), "Binh", "Congrats").await;

    let hidden = post_json(
        app.clone(),
        &format!("/api/blessing/admin/{second}/approve"),
        &json!({"approved": false}),
    )
    .await;
    assert_eq!(hidden.status(), StatusCode::OK);
    assert_eq!(body_json(hidden).await["data"]["is_approved"], false);

    let public = body_json(get(app.clone(), "/api/blessing/latest").await).await;
    let items = public["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], first);
    assert_eq!(items[0]["from"], "Friend");
    assert_eq!(items[0]["approved"], true);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/blessing/latest?limit=10")
        .header(header::REFERER, "http://localhost:5001/admin/")
        .body(Body::empty())
        .unwrap();
    let admin_view = body_json(common::send(app.clone(), request).await).await;
    assert_eq!(admin_view["data"].as_array().unwrap().len(), 2);
    assert_eq!(admin_view["data"][0]["id"], second, "newest first");

    let stats = body_json(get(app.clone(), "/api/blessing/admin/stats").await).await;
    assert_eq!(stats["data"], json!({"total": 2, "approved": 1, "pending": 1}));

    // Approving is the default when the body omits the flag.
    post_json(
        app.clone(),
        &format!("/api/blessing/admin/{second}/approve"),
        &json!({}),
    )
    .await;
    let stats = body_json(get(app.clone(), "/api/blessing/admin/stats").await).await;
    assert_eq!(stats["data"]["pending"], 0);

    let removed = delete(app.clone(), &format!("/api/blessing/admin/{first}")).await;
    assert_eq!(removed.status(), StatusCode::OK);
    let again = delete(app.clone(), &format!("/api/blessing/admin/{first}")).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let unknown = post_json(app, "/api/blessing/admin/999/approve", &json!({})).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_list_pages_and_filters(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);
    for i in 0..12 {
        send_blessing(app.clone(), &format!("Guest {i}"), "Best wishes").await;
    }
    let special = send_blessing(app.clone(), "Lan", "Love you both").await;
    post_json(
        app.clone(),
        &format!("/api/blessing/admin/{special}/approve"),
        &json!({"approved": false}),
    )
    .await;

    let page = body_json(get(app.clone(), "/api/blessing/admin/list?page=2&per_page=5").await).await;
    assert_eq!(
        page["pagination"],
        json!({"page": 2, "per_page": 5, "total": 13, "total_pages": 3})
    );
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert!(page["data"][0].get("is_approved").is_some());

    let search = body_json(get(app.clone(), "/api/blessing/admin/list?search=Love").await).await;
    assert_eq!(search["pagination"]["total"], 1);
    assert_eq!(search["data"][0]["name"], "Lan");

    let pending = body_json(get(app.clone(), "/api/blessing/admin/list?approved=false").await).await;
    assert_eq!(pending["pagination"]["total"], 1);

    let all = body_json(get(app.clone(), "/api/blessing/admin/list?approved=").await).await;
    assert_eq!(all["pagination"]["total"], 13);

    let clamped = body_json(get(app, "/api/blessing/admin/list?page=0&per_page=1000").await).await;
    assert_eq!(clamped["pagination"]["page"], 1);
    assert_eq!(clamped["pagination"]["per_page"], 100);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn telegram_config_round_trip(pool: SqlitePool) {
    let (app, _site) = common::build_test_app(pool);

    let empty = body_json(get(app.clone(), "/api/telegram/config").await).await;
    assert_eq!(
        empty["data"],
        json!({"bot_token": "", "chat_id": "", "enabled": false})
    );

    let saved = post_json(
        app.clone(),
        "/api/telegram/config",
        &json!({"bot_token": " 123:abc ", "chat_id": "-100", "enabled": true}),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);

    let stored = body_json(get(app, "/api/telegram/config").await).await;
    assert_eq!(
        stored["data"],
        json!({"bot_token": "123:abc", "chat_id": "-100", "enabled": true})
    );
}

/// Stand-in for the Bot API: records each `sendMessage` call.
async fn fake_telegram() -> (String, mpsc::UnboundedReceiver<(String, Value)>) {
    let (tx, rx) = mpsc::unbounded_channel();

    async fn send_message(
        State(tx): State<mpsc::UnboundedSender<(String, Value)>>,
        Path(bot): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let _ = tx.send((bot, body));
        Json(json!({"ok": true}))
    }

    let app = Router::new()
        .route("/{bot}/sendMessage", post(send_message))
        .with_state(tx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), rx)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn new_blessing_is_announced_on_telegram(pool: SqlitePool) {
    let (api_base, mut calls) = fake_telegram().await;
    let site = common::test_site();
    let mut config = common::test_config(site.path());
    config.telegram_api_base = api_base.clone();

    let bus = Arc::new(EventBus::default());
    let notifier = TelegramNotifier::new(pool.clone(), TelegramDelivery::new(api_base));
    tokio::spawn(notifier.run(bus.subscribe()));
    let app = common::build_app(pool, config, Arc::clone(&bus));

    post_json(
        app.clone(),
        "/api/telegram/config",
        &json!({"bot_token": "123:abc", "chat_id": "-100", "enabled": true}),
    )
    .await;
    send_blessing(app, "An", "Happy wedding").await;

    let (bot, body) = tokio::time::timeout(Duration::from_secs(5), calls.recv())
        .await
        .expect("Telegram was not called")
        .unwrap();
    assert_eq!(bot, "bot123:abc");
    assert_eq!(body["chat_id"], "-100");
    assert_eq!(body["parse_mode"], "Markdown");
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("An"));
    assert!(text.contains("Happy wedding"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_telegram_sends_nothing(pool: SqlitePool) {
    let (api_base, mut calls) = fake_telegram().await;
    let site = common::test_site();
    let mut config = common::test_config(site.path());
    config.telegram_api_base = api_base.clone();

    let bus = Arc::new(EventBus::default());
    let notifier = TelegramNotifier::new(pool.clone(), TelegramDelivery::new(api_base));
    tokio::spawn(notifier.run(bus.subscribe()));
    let app = common::build_app(pool, config, Arc::clone(&bus));

    post_json(
        app.clone(),
        "/api/telegram/config",
        &json!({"bot_token": "123:abc", "chat_id": "-100", "enabled": false}),
    )
    .await;
    send_blessing(app, "An", "Hi").await;

    let outcome = tokio::time::timeout(Duration::from_millis(300), calls.recv()).await;
    assert!(outcome.is_err(), "no message expected while disabled");
}
