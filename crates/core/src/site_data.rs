//! Site document rules.
//!
//! The site data is one JSON object whose top-level keys ("sections") are
//! stored as separate rows. This module owns everything that happens to the
//! document between the database and the HTTP layer: seeding, load-time
//! normalization, and the merge rules applied when a client posts a full or
//! partial document back.

use serde_json::{json, Map, Value};

/// The whole site document, keyed by section name.
pub type SiteDocument = Map<String, Value>;

/// Section holding admin bookkeeping (`version`, `lastUpdate`).
pub const SECTION_ADMIN: &str = "admin";
/// Section holding the story timeline array.
pub const SECTION_STORY: &str = "story";
/// Section holding bank transfer accounts and the shared message.
pub const SECTION_PAYMENT: &str = "payment";
/// Legacy wrapper section that older clients nested `story` under.
pub const SECTION_LEGACY_DATA: &str = "data";

/// Document schema version written into `admin.version` on seed.
pub const DOCUMENT_VERSION: &str = "2.0.0";

/// Sections a settings-page save may carry without touching anything else.
const VISIBILITY_SAVE_KEYS: &[&str] = &["visibility", SECTION_ADMIN];

/// Sections an event-page save may carry without touching anything else.
const EVENTS_SAVE_KEYS: &[&str] = &["events", SECTION_ADMIN];

/// Sections inserted on first start, in insertion order.
pub fn default_sections(now: &str) -> Vec<(String, Value)> {
    vec![
        (
            "meta".to_string(),
            json!({
                "title": "Wedding Website",
                "description": "Our Wedding Day",
                "primaryColor": "#9f5958",
            }),
        ),
        (
            "hero".to_string(),
            json!({
                "groomName": "Groom",
                "brideName": "Bride",
                "weddingDate": "2025-01-01",
                "weddingLocation": "Vietnam",
            }),
        ),
        (
            SECTION_ADMIN.to_string(),
            json!({
                "version": DOCUMENT_VERSION,
                "lastUpdate": now,
            }),
        ),
    ]
}

/// Parse a stored section value.
///
/// A row that is not valid JSON loads as an empty object so one corrupt
/// section never takes the whole document down. The error is returned
/// alongside so the caller can log it.
pub fn parse_section(raw: &str) -> (Value, Option<serde_json::Error>) {
    match serde_json::from_str(raw) {
        Ok(value) => (value, None),
        Err(e) => (Value::Object(Map::new()), Some(e)),
    }
}

/// Normalize a freshly loaded document in place.
///
/// - strips inline `dataUrl` blobs from story items
/// - folds a legacy `data.story` array into the top-level `story`
/// - guarantees `payment` is `{ global_message, payments }`
pub fn normalize_loaded(doc: &mut SiteDocument) {
    if let Some(Value::Array(stories)) = doc.get_mut(SECTION_STORY) {
        for story in stories.iter_mut() {
            if let Value::Object(fields) = story {
                fields.remove("dataUrl");
            }
        }
    }

    fold_legacy_story(doc);

    match doc.get_mut(SECTION_PAYMENT) {
        Some(Value::Object(payment)) => {
            payment
                .entry("global_message")
                .or_insert_with(|| Value::String(String::new()));
            payment
                .entry("payments")
                .or_insert_with(|| Value::Array(Vec::new()));
        }
        _ => {
            doc.insert(
                SECTION_PAYMENT.to_string(),
                json!({ "global_message": "", "payments": [] }),
            );
        }
    }
}

/// Move `data.story` into `story`, keeping existing entries first and
/// skipping legacy entries that are already present.
fn fold_legacy_story(doc: &mut SiteDocument) {
    let legacy = match doc.get_mut(SECTION_LEGACY_DATA) {
        Some(Value::Object(data)) if matches!(data.get(SECTION_STORY), Some(Value::Array(_))) => {
            match data.remove(SECTION_STORY) {
                Some(Value::Array(items)) => items,
                _ => return,
            }
        }
        _ => return,
    };

    match doc.get_mut(SECTION_STORY) {
        Some(Value::Array(current)) => {
            for item in legacy {
                if !current.contains(&item) {
                    current.push(item);
                }
            }
        }
        _ => {
            doc.insert(SECTION_STORY.to_string(), Value::Array(legacy));
        }
    }
}

/// Recursively merge `source` into `target`.
///
/// Objects merge key by key; any other value (arrays included) replaces
/// whatever was there.
pub fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                deep_merge(existing, incoming);
                continue;
            }
            target.insert(key, Value::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

/// How an incoming full-document save is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStrategy {
    /// Only `visibility`/`admin` present: replace those sections.
    VisibilityOnly,
    /// Only `events`/`admin` present: replace those sections.
    EventsOnly,
    /// Anything else: deep merge with list replacement.
    DeepMerge,
}

/// Pick the save strategy from the incoming top-level keys.
pub fn classify_save(incoming: &SiteDocument) -> SaveStrategy {
    let subset_of = |allowed: &[&str]| incoming.keys().all(|k| allowed.contains(&k.as_str()));

    if subset_of(VISIBILITY_SAVE_KEYS) {
        SaveStrategy::VisibilityOnly
    } else if subset_of(EVENTS_SAVE_KEYS) {
        SaveStrategy::EventsOnly
    } else {
        SaveStrategy::DeepMerge
    }
}

/// Apply an incoming save to the current document and return the result.
///
/// On a deep merge, a `story` array and `hero.slides` from the request
/// replace the stored lists wholesale, and any legacy `data.story` is
/// dropped so it can never resurrect deleted stories.
pub fn merge_for_save(mut current: SiteDocument, incoming: SiteDocument) -> SiteDocument {
    match classify_save(&incoming) {
        SaveStrategy::VisibilityOnly | SaveStrategy::EventsOnly => {
            for (key, value) in incoming {
                current.insert(key, value);
            }
            current
        }
        SaveStrategy::DeepMerge => {
            let story = match incoming.get(SECTION_STORY) {
                Some(Value::Array(items)) => Some(items.clone()),
                _ => None,
            };
            let slides = incoming
                .get("hero")
                .and_then(|hero| hero.get("slides"))
                .cloned();

            deep_merge(&mut current, incoming);

            if let Some(items) = story {
                current.insert(SECTION_STORY.to_string(), Value::Array(items));
                if let Some(Value::Object(data)) = current.get_mut(SECTION_LEGACY_DATA) {
                    data.remove(SECTION_STORY);
                }
            }

            if let Some(slides) = slides {
                let hero = current
                    .entry("hero")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(hero) = hero {
                    hero.insert("slides".to_string(), slides);
                }
            }

            current
        }
    }
}

/// Stamp `lastUpdate` onto an `admin` section value.
///
/// Non-object values are left alone.
pub fn stamp_admin(section: &mut Value, now: &str) {
    if let Value::Object(fields) = section {
        fields.insert("lastUpdate".to_string(), Value::String(now.to_string()));
    }
}
