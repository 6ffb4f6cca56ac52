//! Repository for the single-row `telegram_config` table.

use sqlx::SqlitePool;

use crate::models::telegram_config::{TelegramConfig, UpsertTelegramConfig};

/// Column list for `telegram_config` queries.
const COLUMNS: &str = "bot_token, chat_id, enabled, updated_at";

pub struct TelegramConfigRepo;

impl TelegramConfigRepo {
    /// The stored config, if it was ever saved.
    pub async fn get(pool: &SqlitePool) -> Result<Option<TelegramConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM telegram_config WHERE id = 1");
        sqlx::query_as::<_, TelegramConfig>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the config row.
    pub async fn upsert(
        pool: &SqlitePool,
        input: &UpsertTelegramConfig,
    ) -> Result<TelegramConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO telegram_config (id, bot_token, chat_id, enabled) \
             VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
                bot_token = excluded.bot_token, \
                chat_id = excluded.chat_id, \
                enabled = excluded.enabled, \
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TelegramConfig>(&query)
            .bind(input.bot_token.trim())
            .bind(input.chat_id.trim())
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }
}
