//! Telegram notification settings.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use wedding_db::models::telegram_config::{TelegramConfig, UpsertTelegramConfig};
use wedding_db::repositories::TelegramConfigRepo;

use crate::error::AppResult;
use crate::handlers::json_body;
use crate::response::ApiResponse;
use crate::state::AppState;

/// The config as the dashboard edits it.
#[derive(Debug, Default, Serialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    pub enabled: bool,
}

impl From<TelegramConfig> for TelegramSettings {
    fn from(c: TelegramConfig) -> Self {
        Self {
            bot_token: c.bot_token,
            chat_id: c.chat_id,
            enabled: c.enabled,
        }
    }
}

/// GET /api/telegram/config
pub async fn get_config(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TelegramSettings>>> {
    let settings = TelegramConfigRepo::get(&state.pool)
        .await?
        .map(TelegramSettings::from)
        .unwrap_or_default();
    Ok(Json(ApiResponse::ok(settings)))
}

/// POST /api/telegram/config
pub async fn save_config(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<TelegramSettings>>> {
    let input: UpsertTelegramConfig = json_body(&body)?;
    let saved = TelegramConfigRepo::upsert(&state.pool, &input).await?;

    tracing::info!(enabled = saved.enabled, deliverable = saved.is_deliverable(), "Telegram config saved");
    Ok(Json(ApiResponse::with_message(
        "Telegram config saved",
        saved.into(),
    )))
}
