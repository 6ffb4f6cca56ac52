//! Database backup catalogue.

use serde::Serialize;
use sqlx::FromRow;
use wedding_core::types::{DbId, Timestamp};

/// A row from the `backups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Backup {
    pub id: DbId,
    pub filename: String,
    pub file_path: String,
    pub size: i64,
    pub created_at: Timestamp,
}

/// Aggregate numbers over the catalogue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BackupTotals {
    pub total_backups: i64,
    pub total_size: i64,
}
