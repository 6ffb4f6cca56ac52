//! Telegram Bot API delivery.
//!
//! [`TelegramDelivery`] posts a Markdown message to a chat through the
//! `sendMessage` method. A single attempt is made per message.

use std::time::Duration;

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// HTTP request timeout for one `sendMessage` call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Bot API answered with a non-2xx status.
    #[error("Telegram returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// TelegramDelivery
// ---------------------------------------------------------------------------

/// Sends messages through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramDelivery {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramDelivery {
    /// Create a delivery client against `api_base` (normally
    /// [`DEFAULT_API_BASE`]).
    pub fn new(api_base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{api_base}/bot{token}/sendMessage`
    pub fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{bot_token}/sendMessage", self.api_base)
    }

    /// Send `text` (Markdown) to `chat_id`.
    pub async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<(), TelegramError> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl Default for TelegramDelivery {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
