//! Repository for the `blessings` table.

use sqlx::SqlitePool;
use wedding_core::types::DbId;

use crate::models::blessing::{Blessing, BlessingStats};

/// Column list for `blessings` queries.
const COLUMNS: &str = "id, name, from_person, content, is_approved, created_at";

/// Filters for the admin list.
#[derive(Debug, Clone, Default)]
pub struct BlessingFilter<'a> {
    /// Substring matched against name or content.
    pub search: Option<&'a str>,
    pub approved: Option<bool>,
}

impl BlessingFilter<'_> {
    /// `WHERE` clause and the index of the next free placeholder.
    fn where_clause(&self) -> (String, usize) {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if self.search.is_some() {
            conditions.push(format!(
                "(name LIKE ${param_idx} OR content LIKE ${param_idx})"
            ));
            param_idx += 1;
        }
        if self.approved.is_some() {
            conditions.push(format!("is_approved = ${param_idx}"));
            param_idx += 1;
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (clause, param_idx)
    }

    fn pattern(&self) -> Option<String> {
        self.search.map(|s| format!("%{s}%"))
    }
}

/// Guest blessings and their moderation state.
pub struct BlessingRepo;

impl BlessingRepo {
    /// Insert an approved blessing, returning the full row.
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        from_person: &str,
        content: &str,
    ) -> Result<Blessing, sqlx::Error> {
        let query = format!(
            "INSERT INTO blessings (name, from_person, content) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Blessing>(&query)
            .bind(name)
            .bind(from_person)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Newest blessings first. Unapproved ones only when `include_pending`.
    pub async fn latest(
        pool: &SqlitePool,
        limit: i64,
        include_pending: bool,
    ) -> Result<Vec<Blessing>, sqlx::Error> {
        let where_clause = if include_pending {
            ""
        } else {
            "WHERE is_approved = 1"
        };
        let query = format!(
            "SELECT {COLUMNS} FROM blessings {where_clause} \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, Blessing>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// One page of blessings matching `filter`, newest first.
    pub async fn list_filtered(
        pool: &SqlitePool,
        filter: &BlessingFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Blessing>, sqlx::Error> {
        let (where_clause, param_idx) = filter.where_clause();
        let query = format!(
            "SELECT {COLUMNS} FROM blessings {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Blessing>(&query);
        if let Some(pattern) = filter.pattern() {
            q = q.bind(pattern);
        }
        if let Some(approved) = filter.approved {
            q = q.bind(approved);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Number of blessings matching `filter`.
    pub async fn count_filtered(
        pool: &SqlitePool,
        filter: &BlessingFilter<'_>,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter.where_clause();
        let query = format!("SELECT COUNT(*) FROM blessings {where_clause}");

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        if let Some(pattern) = filter.pattern() {
            q = q.bind(pattern);
        }
        if let Some(approved) = filter.approved {
            q = q.bind(approved);
        }
        let (count,) = q.fetch_one(pool).await?;
        Ok(count)
    }

    pub async fn stats(pool: &SqlitePool) -> Result<BlessingStats, sqlx::Error> {
        sqlx::query_as::<_, BlessingStats>(
            "SELECT \
                COUNT(*) AS total, \
                COALESCE(SUM(CASE WHEN is_approved = 1 THEN 1 ELSE 0 END), 0) AS approved, \
                COALESCE(SUM(CASE WHEN is_approved = 1 THEN 0 ELSE 1 END), 0) AS pending \
             FROM blessings",
        )
        .fetch_one(pool)
        .await
    }

    /// Set the approval flag. Returns the updated row if found.
    pub async fn set_approved(
        pool: &SqlitePool,
        id: DbId,
        approved: bool,
    ) -> Result<Option<Blessing>, sqlx::Error> {
        let query =
            format!("UPDATE blessings SET is_approved = $1 WHERE id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Blessing>(&query)
            .bind(approved)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blessings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
