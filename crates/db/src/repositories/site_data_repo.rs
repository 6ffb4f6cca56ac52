//! Repository for the `site_data` table.

use sqlx::SqlitePool;

use crate::models::site_section::SiteSection;

/// Column list for `site_data` queries.
const COLUMNS: &str = "id, key, value, created_at, updated_at";

const UPSERT: &str = "\
    INSERT INTO site_data (key, value) VALUES ($1, $2) \
    ON CONFLICT (key) DO UPDATE SET \
        value = excluded.value, \
        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Stores one JSON text per document section.
pub struct SiteDataRepo;

impl SiteDataRepo {
    /// All sections in insertion order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<SiteSection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_data ORDER BY id");
        sqlx::query_as::<_, SiteSection>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a section by key.
    pub async fn find(pool: &SqlitePool, key: &str) -> Result<Option<SiteSection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_data WHERE key = $1");
        sqlx::query_as::<_, SiteSection>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace one section.
    pub async fn upsert(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT).bind(key).bind(value).execute(pool).await?;
        Ok(())
    }

    /// Insert or replace several sections in one transaction.
    pub async fn upsert_many(
        pool: &SqlitePool,
        sections: &[(String, String)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for (key, value) in sections {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }

    /// Number of stored sections.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM site_data")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Insert `sections` only when the table is empty. Returns whether
    /// anything was written.
    pub async fn seed_if_empty(
        pool: &SqlitePool,
        sections: &[(String, String)],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM site_data")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(false);
        }
        for (key, value) in sections {
            sqlx::query("INSERT INTO site_data (key, value) VALUES ($1, $2)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(true)
    }
}
