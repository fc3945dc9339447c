use crate::schema::SectionSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One top-level content record for a page area.
///
/// Scalar heading values are kept as a name -> value map so the same document
/// type serves every schema; the field list itself lives in the schema.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct SectionDocument {
    pub id: String,
    pub fields: BTreeMap<String, String>,
    pub items: Vec<SectionItem>,
}

/// A repeatable sub-entry within a section (feature card, itinerary stop...).
///
/// `media` holds persisted relative paths as returned by the backend. Single
/// arity sections use at most one entry; gallery sections any number.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub(crate) struct SectionItem {
    pub fields: BTreeMap<String, String>,
    pub media: Vec<String>,
}

/// A locally chosen file that has not been uploaded yet.
///
/// Bytes are read eagerly when the user picks the file so the rest of the
/// pipeline stays synchronous and testable off-browser.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FileAttachment {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn value_to_media(v: &serde_json::Value) -> Vec<String> {
    // Backends have been observed returning either a single path string or an
    // array of paths for the same logical field; accept both.
    match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        serde_json::Value::Array(arr) => arr
            .iter()
            .filter_map(|x| x.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_item(schema: &SectionSchema, v: &serde_json::Value) -> SectionItem {
    let get_s = |k: &str| v.get(k).and_then(|x| x.as_str()).map(|s| s.to_string());

    let mut fields = BTreeMap::new();
    for f in schema.item.fields {
        if let Some(val) = get_s(f.name) {
            fields.insert(f.name.to_string(), val);
        }
    }

    let media = v
        .get("image")
        .or_else(|| v.get("images"))
        .or_else(|| v.get("media"))
        .map(value_to_media)
        .unwrap_or_default();

    SectionItem { fields, media }
}

/// Parse one section document from a backend JSON object.
///
/// Records without an id are rejected (the id is the document's identity).
pub(crate) fn parse_section(
    schema: &SectionSchema,
    v: &serde_json::Value,
) -> Option<SectionDocument> {
    let id = v
        .get("id")
        .or_else(|| v.get("_id"))
        .and_then(|x| x.as_str())
        .map(|s| s.to_string())?;

    if id.trim().is_empty() {
        return None;
    }

    let get_s = |k: &str| v.get(k).and_then(|x| x.as_str()).map(|s| s.to_string());

    let mut fields = BTreeMap::new();
    for f in schema.heading_fields {
        if let Some(val) = get_s(f.name) {
            fields.insert(f.name.to_string(), val);
        }
    }

    let items = v
        .get("items")
        .and_then(|x| x.as_array())
        .map(|arr| arr.iter().map(|it| parse_item(schema, it)).collect())
        .unwrap_or_default();

    Some(SectionDocument { id, fields, items })
}

/// Parse a collection response: either a bare array or `{ "data": [...] }`.
pub(crate) fn parse_section_list(
    schema: &SectionSchema,
    data: &serde_json::Value,
) -> Vec<SectionDocument> {
    let list = data
        .as_array()
        .or_else(|| data.get("data").and_then(|d| d.as_array()));

    let Some(list) = list else {
        return Vec::new();
    };

    list.iter().filter_map(|v| parse_section(schema, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CELEBRATION, STUDY_ABROAD};

    #[test]
    fn test_parse_section_with_single_image_items() {
        let v = serde_json::json!({
            "id": "abc123",
            "heading": "Celebrate at Sea",
            "tagline": "Unforgettable",
            "items": [
                { "title": "Weddings", "description": "Say yes", "image": "uploads/w.jpg" },
                { "title": "Birthdays", "image": "" }
            ]
        });

        let doc = parse_section(&CELEBRATION, &v).expect("should parse");
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields.get("heading").map(String::as_str), Some("Celebrate at Sea"));
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].media, vec!["uploads/w.jpg".to_string()]);
        assert!(doc.items[1].media.is_empty());
    }

    #[test]
    fn test_parse_section_accepts_media_array() {
        let v = serde_json::json!({
            "id": "p1",
            "heading": "Programs",
            "items": [
                { "title": "Marine Biology", "images": ["uploads/a.jpg", "uploads/b.jpg"] }
            ]
        });

        let doc = parse_section(&STUDY_ABROAD, &v).expect("should parse");
        assert_eq!(
            doc.items[0].media,
            vec!["uploads/a.jpg".to_string(), "uploads/b.jpg".to_string()]
        );
    }

    #[test]
    fn test_parse_section_without_id_is_rejected() {
        let v = serde_json::json!({ "heading": "No identity", "items": [] });
        assert!(parse_section(&CELEBRATION, &v).is_none());
    }

    #[test]
    fn test_parse_section_list_accepts_bare_array_and_wrapper() {
        let bare = serde_json::json!([{ "id": "a", "heading": "H", "items": [] }]);
        let wrapped = serde_json::json!({ "data": [{ "id": "a", "heading": "H", "items": [] }] });

        assert_eq!(parse_section_list(&CELEBRATION, &bare).len(), 1);
        assert_eq!(parse_section_list(&CELEBRATION, &wrapped).len(), 1);
        assert!(parse_section_list(&CELEBRATION, &serde_json::json!({})).is_empty());
    }
}
