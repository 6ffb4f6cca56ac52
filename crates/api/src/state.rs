use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wedding_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for publishing site events.
    pub event_bus: Arc<wedding_events::EventBus>,
    /// Serializes read-modify-write cycles on the site document and backups.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        pool: wedding_db::DbPool,
        config: ServerConfig,
        event_bus: Arc<wedding_events::EventBus>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
