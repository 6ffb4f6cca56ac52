//! Stored sections of the site document.

use serde::Serialize;
use sqlx::FromRow;
use wedding_core::types::{DbId, Timestamp};

/// A row from the `site_data` table. `value` is the section's JSON text.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSection {
    pub id: DbId,
    pub key: String,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
