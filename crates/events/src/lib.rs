//! Wedding site event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`SiteEvent`]: the event envelope.
//! - [`delivery`]: external delivery channels (Telegram).
//! - [`TelegramNotifier`]: background service announcing new blessings.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{EventBus, SiteEvent};
pub use delivery::telegram::TelegramDelivery;
pub use notifier::TelegramNotifier;
