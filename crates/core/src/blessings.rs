//! Guest blessings: submission rules, admin paging, notification text.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default page size of the admin list.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Largest page the admin list will serve.
pub const MAX_PER_PAGE: i64 = 100;

/// Default number of blessings on the public wall.
pub const DEFAULT_LATEST_LIMIT: i64 = 5;

/// Largest number of blessings the public wall may request.
pub const MAX_LATEST_LIMIT: i64 = 100;

/// A blessing as submitted by a guest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlessingSubmission {
    pub name: Option<String>,
    pub from: Option<String>,
    pub content: Option<String>,
}

/// A submission that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBlessing {
    pub name: String,
    pub from: String,
    pub content: String,
}

impl BlessingSubmission {
    /// Check each field in order and report the first one that is missing.
    pub fn validate(self) -> Result<ValidBlessing, CoreError> {
        fn field(name: &str, value: Option<String>) -> Result<String, CoreError> {
            match value.map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(CoreError::Validation(format!("Field {name} is required"))),
            }
        }

        Ok(ValidBlessing {
            name: field("name", self.name)?,
            from: field("from", self.from)?,
            content: field("content", self.content)?,
        })
    }
}

/// Page window for the admin list, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }
}

/// Clamp the public wall limit.
pub fn latest_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LATEST_LIMIT).clamp(1, MAX_LATEST_LIMIT)
}

/// Parse the `approved` filter: `true`/`false`, anything else means all.
pub fn approved_filter(raw: Option<&str>) -> Option<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("true") | Some("1") => Some(true),
        Some("false") | Some("0") => Some(false),
        _ => None,
    }
}

/// Whether the request came from the admin dashboard, judged by `Referer`.
/// Admin views also see blessings that are not approved.
pub fn is_admin_referer(referer: Option<&str>) -> bool {
    referer.is_some_and(|r| r.contains("admin"))
}

/// Telegram Markdown message announcing a new blessing.
pub fn notification_text(blessing: &ValidBlessing, at: Timestamp) -> String {
    format!(
        "🎉 *New blessing from {name}*\n\n\
         👤 *Sender:* {name}\n\
         👥 *Relation:* {from}\n\
         💬 *Message:* {content}\n\n\
         ⏰ *Time:* {time}",
        name = blessing.name,
        from = blessing.from,
        content = blessing.content,
        time = at.format("%d/%m/%Y %H:%M:%S"),
    )
}
