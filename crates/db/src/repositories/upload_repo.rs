//! Repository for the `uploads` table.

use sqlx::SqlitePool;

use crate::models::upload::{NewUpload, Upload};

/// Column list for `uploads` queries.
const COLUMNS: &str = "\
    id, filename, original_name, file_path, file_type, \
    file_size, upload_type, created_at";

/// Records of files written by the upload endpoints.
pub struct UploadRepo;

impl UploadRepo {
    pub async fn create(pool: &SqlitePool, input: &NewUpload) -> Result<Upload, sqlx::Error> {
        let query = format!(
            "INSERT INTO uploads \
                (filename, original_name, file_path, file_type, file_size, upload_type) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Upload>(&query)
            .bind(&input.filename)
            .bind(&input.original_name)
            .bind(&input.file_path)
            .bind(&input.file_type)
            .bind(input.file_size)
            .bind(&input.upload_type)
            .fetch_one(pool)
            .await
    }

    /// Remove every record of `filename`. Returns the number removed.
    pub async fn delete_by_filename(pool: &SqlitePool, filename: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM uploads WHERE filename = $1")
            .bind(filename)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Newest uploads first, optionally of a single type.
    pub async fn list(
        pool: &SqlitePool,
        upload_type: Option<&str>,
    ) -> Result<Vec<Upload>, sqlx::Error> {
        let query = match upload_type {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM uploads WHERE upload_type = $1 \
                 ORDER BY created_at DESC, id DESC"
            ),
            None => format!("SELECT {COLUMNS} FROM uploads ORDER BY created_at DESC, id DESC"),
        };
        let mut q = sqlx::query_as::<_, Upload>(&query);
        if let Some(t) = upload_type {
            q = q.bind(t);
        }
        q.fetch_all(pool).await
    }
}
