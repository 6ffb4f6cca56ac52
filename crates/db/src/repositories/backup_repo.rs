//! Repository for the `backups` table, plus the snapshot and restore
//! statements that produce and consume backup files.

use sqlx::{Connection, SqliteConnection, SqlitePool};
use wedding_core::types::DbId;

use crate::models::backup::{Backup, BackupTotals};

/// Column list for `backups` queries.
const COLUMNS: &str = "id, filename, file_path, size, created_at";

/// Tables replaced by a restore, with the columns copied for each.
///
/// `backups` is deliberately absent: the catalogue describes files on disk,
/// which a restore does not touch.
const RESTORED_TABLES: &[(&str, &str)] = &[
    ("site_data", "id, key, value, created_at, updated_at"),
    ("settings", "id, key, value, created_at, updated_at"),
    (
        "uploads",
        "id, filename, original_name, file_path, file_type, file_size, upload_type, created_at",
    ),
    (
        "blessings",
        "id, name, from_person, content, is_approved, created_at",
    ),
    (
        "telegram_config",
        "id, bot_token, chat_id, enabled, created_at, updated_at",
    ),
];

/// Backup catalogue and snapshot operations.
pub struct BackupRepo;

impl BackupRepo {
    /// Write a consistent copy of the live database to `path`.
    ///
    /// The target file must not exist yet.
    pub async fn snapshot_to(pool: &SqlitePool, path: &str) -> Result<(), sqlx::Error> {
        sqlx::query("VACUUM INTO $1").bind(path).execute(pool).await?;
        Ok(())
    }

    /// Record a backup file.
    pub async fn create(
        pool: &SqlitePool,
        filename: &str,
        file_path: &str,
        size: i64,
    ) -> Result<Backup, sqlx::Error> {
        let query = format!(
            "INSERT INTO backups (filename, file_path, size) VALUES ($1, $2, $3) \
             ON CONFLICT (filename) DO UPDATE SET \
                file_path = excluded.file_path, \
                size = excluded.size, \
                created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Backup>(&query)
            .bind(filename)
            .bind(file_path)
            .bind(size)
            .fetch_one(pool)
            .await
    }

    /// Every recorded backup, newest first.
    pub async fn list_newest_first(pool: &SqlitePool) -> Result<Vec<Backup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM backups ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Backup>(&query).fetch_all(pool).await
    }

    pub async fn find_by_filename(
        pool: &SqlitePool,
        filename: &str,
    ) -> Result<Option<Backup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM backups WHERE filename = $1");
        sqlx::query_as::<_, Backup>(&query)
            .bind(filename)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM backups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count and total size of recorded backups.
    pub async fn totals(pool: &SqlitePool) -> Result<BackupTotals, sqlx::Error> {
        sqlx::query_as::<_, BackupTotals>(
            "SELECT COUNT(*) AS total_backups, COALESCE(SUM(size), 0) AS total_size FROM backups",
        )
        .fetch_one(pool)
        .await
    }

    /// Replace the content tables with those of the snapshot at `path`.
    ///
    /// The snapshot is attached on a single pooled connection and copied in
    /// one transaction, so readers see either the old or the new content.
    pub async fn restore_from(pool: &SqlitePool, path: &str) -> Result<(), sqlx::Error> {
        let mut conn = pool.acquire().await?;

        sqlx::query("ATTACH DATABASE $1 AS snapshot")
            .bind(path)
            .execute(&mut *conn)
            .await?;

        let copied = copy_content_tables(&mut conn).await;

        sqlx::query("DETACH DATABASE snapshot")
            .execute(&mut *conn)
            .await?;

        copied
    }
}

async fn copy_content_tables(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;
    for (table, columns) in RESTORED_TABLES {
        sqlx::query(&format!("DELETE FROM main.{table}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "INSERT INTO main.{table} ({columns}) SELECT {columns} FROM snapshot.{table}"
        ))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}
