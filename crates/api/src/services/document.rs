//! Loading and saving the site document.

use serde_json::Value;
use wedding_core::site_data::{self, SiteDocument, SECTION_ADMIN};
use wedding_db::repositories::SiteDataRepo;
use wedding_db::DbPool;

use crate::error::{AppError, AppResult};

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Read every section and apply the load-time normalization.
pub async fn load(pool: &DbPool) -> AppResult<SiteDocument> {
    let mut doc = SiteDocument::new();
    for row in SiteDataRepo::list(pool).await? {
        let (value, err) = site_data::parse_section(&row.value);
        if let Some(e) = err {
            tracing::error!(section = %row.key, error = %e, "Stored section is not valid JSON");
        }
        doc.insert(row.key, value);
    }
    site_data::normalize_loaded(&mut doc);
    Ok(doc)
}

/// Serialize one section for storage, stamping `admin.lastUpdate`.
fn encode(key: &str, mut value: Value, now: &str) -> AppResult<(String, String)> {
    if key == SECTION_ADMIN {
        site_data::stamp_admin(&mut value, now);
    }
    let text = serde_json::to_string(&value)
        .map_err(|e| AppError::InternalError(format!("Failed to encode section {key}: {e}")))?;
    Ok((key.to_string(), text))
}

/// Upsert every section of `doc` in one transaction.
pub async fn save_all(pool: &DbPool, doc: SiteDocument) -> AppResult<()> {
    let now = now_rfc3339();
    let count = doc.len();
    let sections = doc
        .into_iter()
        .map(|(key, value)| encode(&key, value, &now))
        .collect::<AppResult<Vec<_>>>()?;
    SiteDataRepo::upsert_many(pool, &sections).await?;
    tracing::info!(sections = count, "Site document saved");
    Ok(())
}

/// Upsert several sections in one transaction.
pub async fn save_sections(pool: &DbPool, sections: Vec<(&str, Value)>) -> AppResult<()> {
    let now = now_rfc3339();
    let encoded = sections
        .into_iter()
        .map(|(key, value)| encode(key, value, &now))
        .collect::<AppResult<Vec<_>>>()?;
    SiteDataRepo::upsert_many(pool, &encoded).await?;
    for (key, _) in &encoded {
        tracing::info!(section = %key, "Section updated");
    }
    Ok(())
}

/// Upsert a single section.
pub async fn save_section(pool: &DbPool, key: &str, value: Value) -> AppResult<()> {
    let (key, text) = encode(key, value, &now_rfc3339())?;
    SiteDataRepo::upsert(pool, &key, &text).await?;
    tracing::info!(section = %key, "Section updated");
    Ok(())
}

/// Insert the default sections on first start.
pub async fn seed(pool: &DbPool) -> AppResult<bool> {
    let sections = site_data::default_sections(&now_rfc3339())
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect::<Vec<_>>();
    let seeded = SiteDataRepo::seed_if_empty(pool, &sections).await?;
    if seeded {
        tracing::info!(sections = sections.len(), "Seeded default site data");
    }
    Ok(seeded)
}
