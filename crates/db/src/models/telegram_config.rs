//! Telegram bot settings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wedding_core::types::Timestamp;

/// The single row of the `telegram_config` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub enabled: bool,
    pub updated_at: Timestamp,
}

impl TelegramConfig {
    /// Enabled and carrying both a token and a chat id.
    pub fn is_deliverable(&self) -> bool {
        self.enabled && !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

/// DTO for saving the config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertTelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub enabled: bool,
}
