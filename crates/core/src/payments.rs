//! Bank transfer accounts shown in the gift section.
//!
//! Accounts are stored inside the `payment` section of the site document as
//! `{ "global_message": "...", "payments": [ ... ] }`. Ids are small integers
//! assigned as `max + 1`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DbId;

/// Sort position assigned to stored accounts that never had one.
pub const UNSORTED: i64 = 999;

/// Default QR image for the first (groom side) account.
pub const DEFAULT_QR_PRIMARY: &str = "/public/images/default/qr/qr_man.webp";

/// Default QR image for the remaining accounts.
pub const DEFAULT_QR_SECONDARY: &str = "/public/images/default/qr/qr_woman.webp";

/// URL prefix of QR codes uploaded through the payment form.
pub const UPLOADED_QR_PREFIX: &str = "/public/images/qr/";

fn default_true() -> bool {
    true
}

fn unsorted() -> i64 {
    UNSORTED
}

/// Integer ids may have been stored as numbers, floats or numeric strings.
fn value_to_id(value: &Value) -> Option<DbId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<DbId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value)
        .ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("invalid id: {value}")))
}

/// Nulls read as empty and scalars as their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() != Some(0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => true,
    })
}

fn lenient_sort_order<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(&Value::deserialize(deserializer)?).unwrap_or(UNSORTED))
}

/// One bank account entry.
///
/// Only `id` must be readable; every other field falls back to its default
/// when absent, null or of another JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccount {
    #[serde(deserialize_with = "lenient_id")]
    pub id: DbId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recipient_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bank_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub qr_code_url: String,
    #[serde(default = "default_true", deserialize_with = "lenient_active")]
    pub is_active: bool,
    #[serde(default = "unsorted", deserialize_with = "lenient_sort_order")]
    pub sort_order: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

/// The `payment` section of the site document.
#[derive(Debug, Clone, Default)]
pub struct PaymentSection {
    pub global_message: String,
    pub payments: Vec<PaymentAccount>,
    /// Stored entries that do not read as accounts. They are written back
    /// untouched and still reserve their ids.
    pub unreadable: Vec<Value>,
    /// Keys other clients may have written next to the two known ones.
    pub extra: Map<String, Value>,
}

impl PaymentSection {
    /// Read the section from its stored JSON. Anything that is not an object
    /// reads as an empty section.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let mut extra = map.clone();
        let global_message = extra
            .remove("global_message")
            .map(value_to_string)
            .unwrap_or_default();

        let mut payments = Vec::new();
        let mut unreadable = Vec::new();
        match extra.remove("payments") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    match serde_json::from_value::<PaymentAccount>(entry.clone()) {
                        Ok(account) => payments.push(account),
                        Err(_) => unreadable.push(entry),
                    }
                }
            }
            None | Some(Value::Null) => {}
            Some(other) => unreadable.push(other),
        }

        Self {
            global_message,
            payments,
            unreadable,
            extra,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut entries: Vec<Value> = self
            .payments
            .iter()
            .filter_map(|account| serde_json::to_value(account).ok())
            .collect();
        entries.extend(self.unreadable.iter().cloned());

        let mut map = self.extra.clone();
        map.insert(
            "global_message".into(),
            Value::String(self.global_message.clone()),
        );
        map.insert("payments".into(), Value::Array(entries));
        Value::Object(map)
    }

    pub fn find(&self, id: DbId) -> Option<&PaymentAccount> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Next free id: one past the largest id of any stored entry.
    pub fn next_id(&self) -> DbId {
        let readable = self.payments.iter().map(|p| p.id);
        let raw = self
            .unreadable
            .iter()
            .filter_map(|entry| entry.get("id").and_then(value_to_id));
        readable.chain(raw).max().unwrap_or(0).max(0) + 1
    }
}

/// Fields accepted when creating or updating an account.
///
/// Every field is optional so the same shape serves both JSON bodies and
/// multipart forms; creation enforces the required ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentDraft {
    pub recipient_name: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub qr_code_url: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

fn required(field: &str, value: &Option<String>) -> Result<String, CoreError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CoreError::Validation(format!("Field {field} is required"))),
    }
}

/// Build a new account from a draft.
///
/// `qr_code_url` overrides whatever the draft carries (used when a QR file
/// was uploaded alongside the form).
pub fn create_account(
    section: &PaymentSection,
    draft: PaymentDraft,
    qr_code_url: Option<String>,
    now: &str,
) -> Result<PaymentAccount, CoreError> {
    let recipient_name = required("recipient_name", &draft.recipient_name)?;
    let bank_name = required("bank_name", &draft.bank_name)?;
    let account_number = required("account_number", &draft.account_number)?;

    Ok(PaymentAccount {
        id: section.next_id(),
        recipient_name,
        bank_name,
        account_number,
        title: draft.title.unwrap_or_default(),
        description: draft.description.unwrap_or_default(),
        qr_code_url: qr_code_url.or(draft.qr_code_url).unwrap_or_default(),
        is_active: draft.is_active.unwrap_or(true),
        sort_order: draft.sort_order.unwrap_or(1),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    })
}

/// Apply a draft on top of an existing account. Absent fields keep their
/// current value.
pub fn apply_update(
    existing: &PaymentAccount,
    draft: PaymentDraft,
    qr_code_url: Option<String>,
    now: &str,
) -> PaymentAccount {
    PaymentAccount {
        id: existing.id,
        recipient_name: draft
            .recipient_name
            .unwrap_or_else(|| existing.recipient_name.clone()),
        bank_name: draft.bank_name.unwrap_or_else(|| existing.bank_name.clone()),
        account_number: draft
            .account_number
            .unwrap_or_else(|| existing.account_number.clone()),
        title: draft.title.unwrap_or_else(|| existing.title.clone()),
        description: draft
            .description
            .unwrap_or_else(|| existing.description.clone()),
        qr_code_url: qr_code_url
            .or(draft.qr_code_url)
            .unwrap_or_else(|| existing.qr_code_url.clone()),
        is_active: draft.is_active.unwrap_or(existing.is_active),
        sort_order: draft.sort_order.unwrap_or(existing.sort_order),
        created_at: existing.created_at.clone(),
        updated_at: now.to_string(),
    }
}

/// Accounts ordered by `sort_order`, then creation time.
pub fn sorted(accounts: &[PaymentAccount]) -> Vec<PaymentAccount> {
    let mut out = accounts.to_vec();
    out.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    out
}

/// QR image shown for an account that has none uploaded.
pub fn default_qr_url(account: &PaymentAccount) -> &'static str {
    if account.sort_order == 1 || account.id % 2 == 1 {
        DEFAULT_QR_PRIMARY
    } else {
        DEFAULT_QR_SECONDARY
    }
}

/// The public view: active accounts only, sorted, each with a QR image.
pub fn frontend_accounts(accounts: &[PaymentAccount]) -> Vec<PaymentAccount> {
    sorted(accounts)
        .into_iter()
        .filter(|a| a.is_active)
        .map(|mut a| {
            if a.qr_code_url.is_empty() {
                a.qr_code_url = default_qr_url(&a).to_string();
            }
            a
        })
        .collect()
}

/// File name of an uploaded QR code, if `url` points at one.
pub fn uploaded_qr_filename(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOADED_QR_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
}
