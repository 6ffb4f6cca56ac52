//! Announces new blessings on Telegram.
//!
//! [`TelegramNotifier`] subscribes to the event bus and, for every
//! `blessing.received` event, loads the stored bot settings and sends one
//! message. Failures are logged and never reach the guest who submitted.

use tokio::sync::broadcast;
use wedding_core::blessings::{notification_text, ValidBlessing};
use wedding_db::repositories::TelegramConfigRepo;
use wedding_db::DbPool;

use crate::bus::{SiteEvent, BLESSING_RECEIVED};
use crate::delivery::telegram::{TelegramDelivery, TelegramError};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The bot settings could not be loaded.
    #[error("Failed to load Telegram config: {0}")]
    Config(#[from] sqlx::Error),

    #[error(transparent)]
    Delivery(#[from] TelegramError),
}

pub struct TelegramNotifier {
    pool: DbPool,
    delivery: TelegramDelivery,
}

impl TelegramNotifier {
    pub fn new(pool: DbPool, delivery: TelegramDelivery) -> Self {
        Self { pool, delivery }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<SiteEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.event_type == BLESSING_RECEIVED => {
                    if let Err(e) = self.notify(&event).await {
                        tracing::error!(
                            error = %e,
                            blessing_id = ?event.source_entity_id,
                            "Telegram notification failed"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Telegram notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, Telegram notifier shutting down");
                    break;
                }
            }
        }
    }

    /// Send one notification for a `blessing.received` event.
    ///
    /// Returns `Ok(false)` when Telegram is disabled or not configured.
    pub async fn notify(&self, event: &SiteEvent) -> Result<bool, NotifyError> {
        let config = match TelegramConfigRepo::get(&self.pool).await? {
            Some(config) if config.is_deliverable() => config,
            _ => {
                tracing::info!("Telegram not configured or disabled, skipping notification");
                return Ok(false);
            }
        };

        let field = |name: &str| {
            event.payload[name]
                .as_str()
                .unwrap_or_default()
                .to_string()
        };
        let blessing = ValidBlessing {
            name: field("name"),
            from: field("from"),
            content: field("content"),
        };
        let text = notification_text(&blessing, event.timestamp);

        self.delivery
            .send_message(&config.bot_token, &config.chat_id, &text)
            .await?;

        tracing::info!(
            blessing_id = ?event.source_entity_id,
            "Telegram notification sent"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wedding_db::models::telegram_config::UpsertTelegramConfig;

    use super::*;

    fn notifier(pool: DbPool) -> TelegramNotifier {
        TelegramNotifier::new(pool, TelegramDelivery::new("http://127.0.0.1:9"))
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn skips_when_unconfigured(pool: DbPool) {
        let event = SiteEvent::new(BLESSING_RECEIVED);
        assert_matches!(notifier(pool).notify(&event).await, Ok(false));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn config_load_failure_is_a_config_error(pool: DbPool) {
        pool.close().await;
        let event = SiteEvent::new(BLESSING_RECEIVED);
        assert_matches!(
            notifier(pool).notify(&event).await,
            Err(NotifyError::Config(_))
        );
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn unreachable_api_is_a_delivery_error(pool: DbPool) {
        let config = UpsertTelegramConfig {
            bot_token: "123:abc".into(),
            chat_id: "42".into(),
            enabled: true,
        };
        TelegramConfigRepo::upsert(&pool, &config).await.unwrap();

        let event = SiteEvent::new(BLESSING_RECEIVED);
        assert_matches!(
            notifier(pool).notify(&event).await,
            Err(NotifyError::Delivery(TelegramError::Request(_)))
        );
    }
}
