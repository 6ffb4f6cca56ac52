//! Ordered item lists inside the site document.
//!
//! Banner slides (`hero.slides`), the story timeline (`story`) and the
//! gallery (`gallery`) are all arrays of objects carrying a string `id`.
//! The admin tabs add, edit, remove and reorder them; those operations live
//! here so they are applied identically no matter which endpoint drives them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::site_data::SiteDocument;

/// One of the ordered lists stored in the site document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// `hero.slides`
    Slides,
    /// `story`
    Story,
    /// `gallery`
    Gallery,
}

impl Collection {
    /// The top-level section that owns this collection.
    pub fn section(self) -> &'static str {
        match self {
            Collection::Slides => "hero",
            Collection::Story => "story",
            Collection::Gallery => "gallery",
        }
    }

    /// Prefix used when generating ids for new items.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Collection::Slides => "banner",
            Collection::Story => "story",
            Collection::Gallery => "gallery",
        }
    }

    /// Entity label used in not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            Collection::Slides => "BannerSlide",
            Collection::Story => "StoryItem",
            Collection::Gallery => "GalleryImage",
        }
    }

    /// Fields that must be non-empty strings on every item.
    fn required_fields(self) -> &'static [&'static str] {
        match self {
            Collection::Story => &["milestone", "title", "description"],
            Collection::Slides | Collection::Gallery => &[],
        }
    }

    /// Read the items out of the document. Missing or malformed lists read
    /// as empty.
    pub fn items(self, doc: &SiteDocument) -> Vec<Value> {
        let list = match self {
            Collection::Slides => doc.get("hero").and_then(|hero| hero.get("slides")),
            Collection::Story | Collection::Gallery => doc.get(self.section()),
        };
        match list {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Write the items back into the document, creating the owning section
    /// when needed.
    pub fn store(self, doc: &mut SiteDocument, items: Vec<Value>) {
        match self {
            Collection::Slides => {
                let hero = doc
                    .entry("hero")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !hero.is_object() {
                    *hero = Value::Object(Map::new());
                }
                if let Value::Object(hero) = hero {
                    hero.insert("slides".to_string(), Value::Array(items));
                }
            }
            Collection::Story | Collection::Gallery => {
                doc.insert(self.section().to_string(), Value::Array(items));
            }
        }
    }
}

/// Where to move an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MoveTarget {
    /// Swap with the neighbour above or below.
    Direction { direction: Direction },
    /// Move to a 1-based position.
    Position { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

fn visible_by_default() -> bool {
    true
}

/// Typed view of a `hero.slides` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerSlide {
    pub id: String,
    pub src: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed view of a `story` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: String,
    pub src: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub milestone: Option<String>,
    pub content: Option<String>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed view of a `gallery` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub src: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Check that `fields` deserializes into the collection's typed item.
/// Unknown keys are accepted; known keys must have the right type.
fn check_shape(collection: Collection, fields: &Map<String, Value>) -> Result<(), CoreError> {
    let value = Value::Object(fields.clone());
    let result = match collection {
        Collection::Slides => serde_json::from_value::<BannerSlide>(value).map(drop),
        Collection::Story => serde_json::from_value::<StoryItem>(value).map(drop),
        Collection::Gallery => serde_json::from_value::<GalleryImage>(value).map(drop),
    };
    result.map_err(|e| CoreError::Validation(format!("Invalid {}: {e}", collection.entity())))
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

/// Index of the item with the given id.
pub fn find_index(items: &[Value], id: &str) -> Option<usize> {
    items.iter().position(|item| item_id(item) == Some(id))
}

fn require_index(collection: Collection, items: &[Value], id: &str) -> Result<usize, CoreError> {
    find_index(items, id).ok_or_else(|| CoreError::not_found(collection.entity(), id))
}

fn validate_fields(collection: Collection, fields: &Map<String, Value>) -> Result<(), CoreError> {
    for field in collection.required_fields() {
        let present = fields
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(CoreError::Validation(format!("Field {field} is required")));
        }
    }
    Ok(())
}

/// Apply the typed checks to a complete item (id already assigned).
fn validate_item(collection: Collection, fields: &Map<String, Value>) -> Result<(), CoreError> {
    validate_fields(collection, fields)?;
    check_shape(collection, fields)
}

/// Ids that would collide with fixed route segments under
/// `/collections/{collection}/`.
pub const RESERVED_IDS: &[&str] = &["reorder"];

/// Append a new item, generating `"{prefix}-{now_millis}"` when it has no id.
///
/// Returns the stored item.
pub fn append(
    collection: Collection,
    items: &mut Vec<Value>,
    mut fields: Map<String, Value>,
    now_millis: i64,
) -> Result<Value, CoreError> {
    validate_fields(collection, &fields)?;

    let id = match fields.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{}-{now_millis}", collection.id_prefix()),
    };
    if RESERVED_IDS.contains(&id.as_str()) {
        return Err(CoreError::Validation(format!(
            "Id {id} is reserved and cannot be used"
        )));
    }
    if find_index(items, &id).is_some() {
        return Err(CoreError::Conflict(format!(
            "{} with id {id} already exists",
            collection.entity()
        )));
    }

    fields.insert("id".to_string(), Value::String(id));
    fields.entry("visible").or_insert(Value::Bool(true));
    check_shape(collection, &fields)?;

    let item = Value::Object(fields);
    items.push(item.clone());
    Ok(item)
}

/// Shallow-merge `patch` into the item with `id`. The id itself never
/// changes.
pub fn update(
    collection: Collection,
    items: &mut [Value],
    id: &str,
    mut patch: Map<String, Value>,
) -> Result<Value, CoreError> {
    let index = require_index(collection, items, id)?;
    patch.remove("id");

    let mut merged = match &items[index] {
        Value::Object(existing) => existing.clone(),
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key, value);
    }
    merged.insert("id".to_string(), Value::String(id.to_string()));
    validate_item(collection, &merged)?;

    items[index] = Value::Object(merged);
    Ok(items[index].clone())
}

/// Remove and return the item with `id`.
pub fn remove(collection: Collection, items: &mut Vec<Value>, id: &str) -> Result<Value, CoreError> {
    let index = require_index(collection, items, id)?;
    Ok(items.remove(index))
}

/// Move the item with `id` and return its new zero-based index.
///
/// A direction move at either edge leaves the list unchanged.
pub fn move_item(
    collection: Collection,
    items: &mut Vec<Value>,
    id: &str,
    target: MoveTarget,
) -> Result<usize, CoreError> {
    let index = require_index(collection, items, id)?;

    match target {
        MoveTarget::Direction { direction } => {
            let neighbour = match direction {
                Direction::Up => index.checked_sub(1),
                Direction::Down => Some(index + 1).filter(|&i| i < items.len()),
            };
            match neighbour {
                Some(other) => {
                    items.swap(index, other);
                    Ok(other)
                }
                None => Ok(index),
            }
        }
        MoveTarget::Position { position } => {
            if position == 0 || position > items.len() {
                return Err(CoreError::Validation(format!(
                    "Position must be between 1 and {}, got {position}",
                    items.len()
                )));
            }
            let item = items.remove(index);
            items.insert(position - 1, item);
            Ok(position - 1)
        }
    }
}

/// Drag-and-drop reorder: take the item at `from` and insert it at `to`.
pub fn reorder(items: &mut Vec<Value>, from: usize, to: usize) -> Result<(), CoreError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(CoreError::Validation(format!(
            "Reorder indices out of range: from {from}, to {to}, length {len}"
        )));
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn ids(items: &[Value]) -> Vec<&str> {
        items.iter().filter_map(item_id).collect()
    }

    fn list(ids: &[&str]) -> Vec<Value> {
        ids.iter().map(|id| json!({ "id": id })).collect()
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    #[test]
    fn collection_deserializes_from_path_segment() {
        let c: Collection = serde_json::from_value(json!("slides")).unwrap();
        assert_eq!(c, Collection::Slides);
        assert!(serde_json::from_value::<Collection>(json!("wishes")).is_err());
    }

    #[test]
    fn slides_live_under_hero() {
        let mut doc = SiteDocument::new();
        doc.insert("hero".into(), json!({ "groomName": "A" }));
        Collection::Slides.store(&mut doc, list(&["s1"]));

        assert_eq!(doc["hero"]["groomName"], "A");
        assert_eq!(ids(&Collection::Slides.items(&doc)), ["s1"]);
        assert!(Collection::Gallery.items(&doc).is_empty());
    }

    #[test]
    fn append_generates_prefixed_id_and_defaults_visible() {
        let mut items = Vec::new();
        let item = append(
            Collection::Slides,
            &mut items,
            fields(json!({ "src": "./public/images/banner/a.jpg" })),
            1_700_000_000_000,
        )
        .unwrap();

        assert_eq!(item["id"], "banner-1700000000000");
        assert_eq!(item["visible"], true);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn append_rejects_duplicate_id() {
        let mut items = list(&["g1"]);
        let err = append(Collection::Gallery, &mut items, fields(json!({ "id": "g1" })), 0);
        assert_matches!(err, Err(CoreError::Conflict(_)));
    }

    #[test]
    fn append_rejects_route_segment_ids() {
        let mut items = Vec::new();
        let err = append(Collection::Gallery, &mut items, fields(json!({ "id": "reorder" })), 0);
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("reserved"));
        assert!(items.is_empty());
    }

    #[test]
    fn story_requires_milestone_title_description() {
        let mut items = Vec::new();
        let err = append(
            Collection::Story,
            &mut items,
            fields(json!({ "title": "First date", "description": "Coffee" })),
            0,
        );
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("milestone"));

        let ok = append(
            Collection::Story,
            &mut items,
            fields(json!({ "milestone": "2019", "title": "First date", "description": "Coffee" })),
            42,
        )
        .unwrap();
        assert_eq!(ok["id"], "story-42");
    }

    #[test]
    fn update_merges_and_keeps_id() {
        let mut items = vec![json!({ "id": "g1", "title": "Old", "category": "gallery" })];
        let updated = update(
            Collection::Gallery,
            &mut items,
            "g1",
            fields(json!({ "id": "hijack", "title": "New" })),
        )
        .unwrap();

        assert_eq!(updated, json!({ "id": "g1", "title": "New", "category": "gallery" }));
        assert_eq!(items[0], updated);
    }

    #[test]
    fn wrong_field_types_are_rejected() {
        let mut items = Vec::new();
        let err = append(
            Collection::Gallery,
            &mut items,
            fields(json!({ "src": "a.jpg", "visible": "yes" })),
            0,
        );
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg.contains("GalleryImage"));
        assert!(items.is_empty());

        let mut items = vec![json!({ "id": "s1", "title": "Old" })];
        let err = update(Collection::Slides, &mut items, "s1", fields(json!({ "title": 5 })));
        assert_matches!(err, Err(CoreError::Validation(_)));
        assert_eq!(items[0]["title"], "Old", "failed update leaves the item untouched");
    }

    #[test]
    fn typed_view_keeps_unknown_fields() {
        let item: StoryItem = serde_json::from_value(json!({
            "id": "story-1",
            "milestone": "2019",
            "image_position": "left"
        }))
        .unwrap();
        assert!(item.visible);
        assert_eq!(item.extra["image_position"], "left");
    }

    #[test]
    fn missing_item_is_not_found() {
        let mut items = list(&["a"]);
        assert_matches!(
            remove(Collection::Story, &mut items, "zzz"),
            Err(CoreError::NotFound { entity: "StoryItem", .. })
        );
    }

    #[test]
    fn move_up_and_down_swaps_neighbours() {
        let mut items = list(&["a", "b", "c"]);
        let target = MoveTarget::Direction { direction: Direction::Up };
        assert_eq!(move_item(Collection::Slides, &mut items, "b", target).unwrap(), 0);
        assert_eq!(ids(&items), ["b", "a", "c"]);

        let target = MoveTarget::Direction { direction: Direction::Down };
        assert_eq!(move_item(Collection::Slides, &mut items, "a", target).unwrap(), 2);
        assert_eq!(ids(&items), ["b", "c", "a"]);
    }

    #[test]
    fn move_at_edges_is_a_no_op() {
        let mut items = list(&["a", "b"]);
        let up = MoveTarget::Direction { direction: Direction::Up };
        assert_eq!(move_item(Collection::Slides, &mut items, "a", up).unwrap(), 0);
        let down = MoveTarget::Direction { direction: Direction::Down };
        assert_eq!(move_item(Collection::Slides, &mut items, "b", down).unwrap(), 1);
        assert_eq!(ids(&items), ["a", "b"]);
    }

    #[test]
    fn move_to_position_splices() {
        let mut items = list(&["a", "b", "c", "d"]);
        let idx = move_item(
            Collection::Slides,
            &mut items,
            "d",
            MoveTarget::Position { position: 2 },
        )
        .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(ids(&items), ["a", "d", "b", "c"]);

        let err = move_item(
            Collection::Slides,
            &mut items,
            "a",
            MoveTarget::Position { position: 5 },
        );
        assert_matches!(err, Err(CoreError::Validation(_)));
    }

    #[test]
    fn move_target_parses_both_shapes() {
        let t: MoveTarget = serde_json::from_value(json!({ "direction": "down" })).unwrap();
        assert_eq!(t, MoveTarget::Direction { direction: Direction::Down });
        let t: MoveTarget = serde_json::from_value(json!({ "position": 3 })).unwrap();
        assert_eq!(t, MoveTarget::Position { position: 3 });
    }

    #[test]
    fn reorder_moves_dragged_item() {
        let mut items = list(&["a", "b", "c", "d"]);
        reorder(&mut items, 0, 2).unwrap();
        assert_eq!(ids(&items), ["b", "c", "a", "d"]);

        reorder(&mut items, 3, 0).unwrap();
        assert_eq!(ids(&items), ["d", "b", "c", "a"]);

        assert_matches!(reorder(&mut items, 4, 0), Err(CoreError::Validation(_)));
    }
}
