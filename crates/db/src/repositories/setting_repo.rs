//! Repository for the `settings` table.

use sqlx::SqlitePool;

use crate::models::setting::Setting;

/// Free-form key/value settings.
pub struct SettingRepo;

impl SettingRepo {
    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    /// All settings whose key is in `keys`.
    pub async fn get_many(pool: &SqlitePool, keys: &[&str]) -> Result<Vec<Setting>, sqlx::Error> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=keys.len()).map(|i| format!("${i}")).collect();
        let query = format!(
            "SELECT key, value FROM settings WHERE key IN ({})",
            placeholders.join(", ")
        );
        let mut q = sqlx::query_as::<_, Setting>(&query);
        for key in keys {
            q = q.bind(*key);
        }
        q.fetch_all(pool).await
    }

    pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET \
                value = excluded.value, \
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }
}
