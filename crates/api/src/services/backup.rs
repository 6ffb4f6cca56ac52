//! Database snapshots, retention and restore.

use wedding_core::backups::{backup_filename, split_retention, validate_backup_filename};
use wedding_core::error::CoreError;
use wedding_db::models::backup::Backup;
use wedding_db::repositories::BackupRepo;
use wedding_events::bus::{SiteEvent, BACKUP_CREATED};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Snapshot the live database into the backup directory and record it.
/// Retention is not applied.
pub async fn snapshot(state: &AppState) -> AppResult<Backup> {
    let dir = &state.config.backup_dir;
    tokio::fs::create_dir_all(dir).await?;

    let filename = backup_filename(chrono::Utc::now());
    let path = dir.join(&filename);
    // VACUUM INTO refuses to overwrite; a second snapshot within the same
    // second replaces the first.
    if tokio::fs::try_exists(&path).await? {
        tokio::fs::remove_file(&path).await?;
    }

    let path_str = path.to_string_lossy().to_string();
    BackupRepo::snapshot_to(&state.pool, &path_str).await?;
    let size = tokio::fs::metadata(&path).await?.len() as i64;
    let backup = BackupRepo::create(&state.pool, &filename, &path_str, size).await?;

    tracing::info!(filename = %backup.filename, size, "Backup created");
    state.event_bus.publish(
        SiteEvent::new(BACKUP_CREATED)
            .with_source("backup", backup.id)
            .with_payload(serde_json::json!({
                "filename": backup.filename,
                "size": backup.size,
            })),
    );
    Ok(backup)
}

/// Snapshot, then apply retention.
pub async fn create(state: &AppState) -> AppResult<Backup> {
    let backup = snapshot(state).await?;
    apply_retention(state).await?;
    Ok(backup)
}

/// Take a backup ahead of a write. A failed backup is logged and does not
/// block the write.
pub async fn before_write(state: &AppState, reason: &'static str) {
    if let Err(e) = create(state).await {
        tracing::warn!(error = %e, reason, "Backup before write failed");
    }
}

/// Drop catalogue rows and files beyond the newest `max_backups`.
/// Returns the number of backups removed.
pub async fn apply_retention(state: &AppState) -> AppResult<usize> {
    let all = BackupRepo::list_newest_first(&state.pool).await?;
    let (_, expired) = split_retention(all, state.config.max_backups);

    for backup in &expired {
        BackupRepo::delete(&state.pool, backup.id).await?;
        match tokio::fs::remove_file(&backup.file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(filename = %backup.filename, error = %e, "Failed to delete old backup file");
            }
        }
        tracing::info!(filename = %backup.filename, "Removed old backup");
    }
    Ok(expired.len())
}

/// Replace the live content with the snapshot named `filename`.
///
/// The current state is snapshotted first so a restore can be undone.
pub async fn restore(state: &AppState, filename: &str) -> AppResult<Backup> {
    validate_backup_filename(filename)?;

    let path = state.config.backup_dir.join(filename);
    if !tokio::fs::try_exists(&path).await? {
        return Err(AppError::Core(CoreError::not_found("Backup", filename)));
    }

    let safety = snapshot(state).await?;
    BackupRepo::restore_from(&state.pool, &path.to_string_lossy()).await?;
    apply_retention(state).await?;

    tracing::info!(filename, safety_backup = %safety.filename, "Database restored from backup");
    Ok(safety)
}
