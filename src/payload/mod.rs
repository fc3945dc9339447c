use crate::form::{MediaSlot, SectionForm};
use crate::schema::{MediaArity, SectionSchema};

/// One part of the multipart body, kept inspectable so tests can assert on
/// exactly what would go over the wire.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PayloadPart {
    Text {
        name: String,
        value: String,
    },
    Binary {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MultipartPayload {
    pub parts: Vec<PayloadPart>,
}

impl MultipartPayload {
    pub fn text_part(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            PayloadPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn binary_parts(&self, name: &str) -> Vec<&PayloadPart> {
        self.parts
            .iter()
            .filter(|p| matches!(p, PayloadPart::Binary { name: n, .. } if n == name))
            .collect()
    }
}

/// Serialize the draft into the backend's multipart shape.
///
/// Scalar heading fields become individual text parts. Items are split into
/// two channels: one JSON array part carrying every item's non-file fields
/// (plus, for kept slots, the still-valid persisted media reference), and
/// zero or more binary parts — one per pending file, appended in item order
/// under the shared files field so the backend re-associates them
/// positionally.
pub(crate) fn build_payload(schema: &SectionSchema, form: &SectionForm) -> MultipartPayload {
    let mut parts = Vec::new();

    for f in schema.heading_fields {
        parts.push(PayloadPart::Text {
            name: f.name.to_string(),
            value: form.fields.get(f.name).cloned().unwrap_or_default(),
        });
    }

    let mut items_json = Vec::with_capacity(form.items.len());
    let mut binaries = Vec::new();

    for draft in &form.items {
        let mut entry = serde_json::Map::new();
        for f in schema.item.fields {
            entry.insert(
                f.name.to_string(),
                serde_json::Value::String(draft.fields.get(f.name).cloned().unwrap_or_default()),
            );
        }

        let kept: Vec<String> = draft
            .slots
            .iter()
            .filter_map(|s| s.persisted_path().map(String::from))
            .collect();

        // A replaced slot contributes no media string at all; the backend
        // infers the replacement from the accompanying binary part.
        match schema.item.media {
            MediaArity::Single => {
                if let Some(path) = kept.first() {
                    entry.insert("image".to_string(), serde_json::Value::String(path.clone()));
                }
            }
            MediaArity::Gallery => {
                if !kept.is_empty() {
                    entry.insert(
                        "images".to_string(),
                        serde_json::Value::Array(
                            kept.iter()
                                .map(|p| serde_json::Value::String(p.clone()))
                                .collect(),
                        ),
                    );
                }
            }
            MediaArity::None => {}
        }

        for slot in &draft.slots {
            if let MediaSlot::Pending { file, .. } = slot {
                binaries.push(PayloadPart::Binary {
                    name: schema.files_part.to_string(),
                    file_name: file.name.clone(),
                    mime: file.mime.clone(),
                    bytes: file.bytes.clone(),
                });
            }
        }

        items_json.push(serde_json::Value::Object(entry));
    }

    parts.push(PayloadPart::Text {
        name: schema.items_part.to_string(),
        value: serde_json::Value::Array(items_json).to_string(),
    });
    parts.extend(binaries);

    MultipartPayload { parts }
}

/// Lower the inspectable payload into a `reqwest` form for dispatch.
pub(crate) fn into_form(payload: MultipartPayload) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();

    for part in payload.parts {
        match part {
            PayloadPart::Text { name, value } => {
                form = form.text(name, value);
            }
            PayloadPart::Binary {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let built = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone());
                let built = if mime.is_empty() {
                    built
                } else {
                    built.mime_str(&mime).unwrap_or_else(|_| {
                        reqwest::multipart::Part::bytes(bytes).file_name(file_name)
                    })
                };
                form = form.part(name, built);
            }
        }
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SectionForm;
    use crate::models::{FileAttachment, SectionDocument, SectionItem};
    use crate::schema::{CELEBRATION, STUDY_ABROAD};
    use std::collections::BTreeMap;

    fn attachment(name: &str) -> FileAttachment {
        FileAttachment {
            name: name.to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    fn items_json(payload: &MultipartPayload) -> Vec<serde_json::Value> {
        let raw = payload.text_part("items").expect("items part present");
        serde_json::from_str::<Vec<serde_json::Value>>(raw).expect("items part is a JSON array")
    }

    fn two_item_doc() -> SectionDocument {
        let item = |title: &str, media: &str| SectionItem {
            fields: {
                let mut m = BTreeMap::new();
                m.insert("title".to_string(), title.to_string());
                m
            },
            media: vec![media.to_string()],
        };

        let mut fields = BTreeMap::new();
        fields.insert("heading".to_string(), "Hero".to_string());
        fields.insert("tagline".to_string(), "Tag".to_string());

        SectionDocument {
            id: "sec1".to_string(),
            fields,
            items: vec![item("A", "uploads/a.jpg"), item("B", "uploads/b.jpg")],
        }
    }

    #[test]
    fn test_create_payload_shape() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();
        form.set_field("heading", "Hero".to_string());
        form.set_item_field(0, "title", "A".to_string());
        form.set_item_file(0, 0, attachment("img1.jpg"));

        let payload = build_payload(&CELEBRATION, &form);

        assert_eq!(payload.text_part("heading"), Some("Hero"));

        let items = items_json(&payload);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "A");
        assert!(items[0].get("image").is_none(), "new file means no media string");

        let files = payload.binary_parts("images");
        assert_eq!(files.len(), 1);
        assert!(matches!(
            files[0],
            PayloadPart::Binary { file_name, .. } if file_name == "img1.jpg"
        ));
    }

    #[test]
    fn test_noop_edit_preserves_media_references_exactly() {
        let doc = two_item_doc();
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_edit(&doc);

        let payload = build_payload(&CELEBRATION, &form);
        let items = items_json(&payload);

        assert_eq!(items[0]["image"], "uploads/a.jpg");
        assert_eq!(items[1]["image"], "uploads/b.jpg");
        assert!(
            payload.binary_parts("images").is_empty(),
            "no-op edit must not upload anything"
        );
        assert_eq!(payload.text_part("heading"), Some("Hero"));
    }

    #[test]
    fn test_partial_replace_sends_exactly_one_binary() {
        let doc = two_item_doc();
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_edit(&doc);

        // Replace only item[1]'s file; item[0] untouched.
        form.set_item_file(1, 0, attachment("replacement.jpg"));

        let payload = build_payload(&CELEBRATION, &form);
        let items = items_json(&payload);

        assert_eq!(items[0]["image"], "uploads/a.jpg");
        assert!(
            items[1].get("image").is_none(),
            "replaced item carries no media string; the binary part stands in"
        );
        assert_eq!(payload.binary_parts("images").len(), 1);
    }

    #[test]
    fn test_gallery_keeps_remaining_paths_as_array() {
        let doc = SectionDocument {
            id: "p1".to_string(),
            fields: BTreeMap::new(),
            items: vec![SectionItem {
                fields: BTreeMap::new(),
                media: vec!["uploads/a.jpg".to_string(), "uploads/b.jpg".to_string()],
            }],
        };

        let mut form = SectionForm::new(&STUDY_ABROAD);
        form.begin_edit(&doc);

        // Replace the first photo, keep the second, append a third.
        form.set_item_file(0, 0, attachment("new-a.jpg"));
        form.set_item_file(0, 2, attachment("c.jpg"));

        let payload = build_payload(&STUDY_ABROAD, &form);
        let items = items_json(&payload);

        assert_eq!(
            items[0]["images"],
            serde_json::json!(["uploads/b.jpg"]),
            "only the kept persisted path survives in the JSON channel"
        );
        assert_eq!(payload.binary_parts("images").len(), 2);
    }

    #[test]
    fn test_binary_parts_follow_item_order() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();
        form.add_item();
        form.set_item_file(0, 0, attachment("first.jpg"));
        form.set_item_file(1, 0, attachment("second.jpg"));

        let payload = build_payload(&CELEBRATION, &form);
        let names: Vec<&str> = payload
            .binary_parts("images")
            .iter()
            .filter_map(|p| match p {
                PayloadPart::Binary { file_name, .. } => Some(file_name.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(names, vec!["first.jpg", "second.jpg"]);
    }

    #[test]
    fn test_missing_fields_serialize_as_empty_strings() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();

        let payload = build_payload(&CELEBRATION, &form);
        assert_eq!(payload.text_part("heading"), Some(""));

        let items = items_json(&payload);
        assert_eq!(items[0]["title"], "");
        assert_eq!(items[0]["description"], "");
    }
}
