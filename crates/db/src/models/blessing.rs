//! Guest blessing entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wedding_core::types::{DbId, Timestamp};

/// A row from the `blessings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Blessing {
    pub id: DbId,
    pub name: String,
    pub from_person: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: Timestamp,
}

/// Query parameters for the admin list.
#[derive(Debug, Default, Deserialize)]
pub struct BlessingListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub approved: Option<String>,
}

/// Query parameters for the public wall.
#[derive(Debug, Default, Deserialize)]
pub struct LatestBlessingParams {
    pub limit: Option<i64>,
}

/// DTO for approving or hiding a blessing.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveBlessing {
    pub approved: Option<bool>,
}

/// Moderation counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlessingStats {
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
}
