//! Backup catalogue, restore and retention.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use wedding_core::backups::{format_megabytes, RECENT_BACKUPS};
use wedding_core::types::Timestamp;
use wedding_db::models::backup::Backup;
use wedding_db::repositories::BackupRepo;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::services::backup;
use crate::state::AppState;

/// A backup as listed to the dashboard.
#[derive(Debug, Serialize)]
pub struct BackupSummary {
    pub filename: String,
    pub created: Timestamp,
    pub size: i64,
}

impl From<Backup> for BackupSummary {
    fn from(b: Backup) -> Self {
        Self {
            filename: b.filename,
            created: b.created_at,
            size: b.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BackupStats {
    pub total_backups: i64,
    pub total_size: i64,
    pub recent_backups: Vec<BackupSummary>,
    pub max_backups: usize,
}

/// GET /api/backups
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<BackupSummary>>>> {
    let backups: Vec<BackupSummary> = BackupRepo::list_newest_first(&state.pool)
        .await?
        .into_iter()
        .map(BackupSummary::from)
        .collect();
    let message = format!("Found {} backups", backups.len());
    Ok(Json(ApiResponse::with_message(message, backups)))
}

/// POST /api/backup/restore/{filename}
pub async fn restore(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Json<ApiResponse<BackupSummary>>> {
    let _guard = state.write_lock.lock().await;
    let safety = backup::restore(&state, &filename).await?;
    Ok(Json(ApiResponse::with_message(
        format!("Restored from backup {filename}"),
        safety.into(),
    )))
}

/// POST /api/backup/cleanup
pub async fn cleanup(State(state): State<AppState>) -> AppResult<Json<ApiResponse<()>>> {
    let _guard = state.write_lock.lock().await;
    let removed = backup::apply_retention(&state).await?;
    Ok(Json(ApiResponse::message(format!(
        "Cleanup finished, {removed} old backups removed"
    ))))
}

/// GET /api/backup/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BackupStats>>> {
    let totals = BackupRepo::totals(&state.pool).await?;
    let recent_backups = BackupRepo::list_newest_first(&state.pool)
        .await?
        .into_iter()
        .take(RECENT_BACKUPS)
        .map(BackupSummary::from)
        .collect();

    let message = format!(
        "{} backups, total size {} MB",
        totals.total_backups,
        format_megabytes(totals.total_size)
    );
    Ok(Json(ApiResponse::with_message(
        message,
        BackupStats {
            total_backups: totals.total_backups,
            total_size: totals.total_size,
            recent_backups,
            max_backups: state.config.max_backups,
        },
    )))
}
