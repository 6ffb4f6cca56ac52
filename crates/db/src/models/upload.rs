//! Uploaded file records.

use serde::Serialize;
use sqlx::FromRow;
use wedding_core::types::{DbId, Timestamp};

/// A row from the `uploads` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Upload {
    pub id: DbId,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub upload_type: String,
    pub created_at: Timestamp,
}

/// Insert payload for a stored upload.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub upload_type: String,
}
