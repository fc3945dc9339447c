use crate::models::{FileAttachment, SectionDocument};
use crate::schema::{MediaArity, SectionSchema};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormMode {
    Create,
    Update { id: String },
}

/// Per-form lifecycle: Idle -> Editing -> Submitting -> back to Idle on
/// success, back to Editing (draft intact) on failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormPhase {
    Idle,
    Editing,
    Submitting,
}

/// One media position on an item draft.
///
/// `Pending.replaces` remembers the persisted path a newly chosen file is
/// standing in for, so clearing the choice reverts to "keep existing".
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MediaSlot {
    Persisted { path: String },
    Pending {
        file: FileAttachment,
        replaces: Option<String>,
    },
}

impl MediaSlot {
    pub fn persisted_path(&self) -> Option<&str> {
        match self {
            MediaSlot::Persisted { path } => Some(path),
            MediaSlot::Pending { .. } => None,
        }
    }

    pub fn pending_file(&self) -> Option<&FileAttachment> {
        match self {
            MediaSlot::Pending { file, .. } => Some(file),
            MediaSlot::Persisted { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ItemDraft {
    pub fields: BTreeMap<String, String>,
    pub slots: Vec<MediaSlot>,
}

/// The draft being created or edited for one section.
///
/// Every mutation goes through these methods; views only read. File-input
/// resets happen by bumping `input_epoch` (views key on it), never by poking
/// at DOM input elements.
#[derive(Clone, Debug)]
pub(crate) struct SectionForm {
    pub schema: &'static SectionSchema,
    pub phase: FormPhase,
    pub mode: FormMode,
    pub fields: BTreeMap<String, String>,
    pub items: Vec<ItemDraft>,
    pub last_error: Option<String>,
    pub input_epoch: u32,
}

fn blank_fields(specs: &[crate::schema::FieldSpec]) -> BTreeMap<String, String> {
    specs
        .iter()
        .map(|f| (f.name.to_string(), String::new()))
        .collect()
}

impl SectionForm {
    pub fn new(schema: &'static SectionSchema) -> Self {
        Self {
            schema,
            phase: FormPhase::Idle,
            mode: FormMode::Create,
            fields: blank_fields(schema.heading_fields),
            items: vec![Self::blank_item(schema)],
            last_error: None,
            input_epoch: 0,
        }
    }

    fn blank_item(schema: &SectionSchema) -> ItemDraft {
        ItemDraft {
            fields: blank_fields(schema.item.fields),
            slots: Vec::new(),
        }
    }

    fn reset_draft(&mut self) {
        self.mode = FormMode::Create;
        self.fields = blank_fields(self.schema.heading_fields);
        self.items = vec![Self::blank_item(self.schema)];
        self.last_error = None;
        self.input_epoch = self.input_epoch.wrapping_add(1);
    }

    /// Start a fresh draft: one empty item, create mode.
    pub fn begin_create(&mut self) {
        self.reset_draft();
        self.phase = FormPhase::Editing;
    }

    /// Seed the draft from a persisted document: scalars copied verbatim,
    /// every persisted media path mapped to a kept slot.
    pub fn begin_edit(&mut self, existing: &SectionDocument) {
        self.reset_draft();
        self.phase = FormPhase::Editing;
        self.mode = FormMode::Update {
            id: existing.id.clone(),
        };

        for (k, v) in &existing.fields {
            self.fields.insert(k.clone(), v.clone());
        }

        if !existing.items.is_empty() {
            self.items = existing
                .items
                .iter()
                .map(|item| {
                    let mut draft = Self::blank_item(self.schema);
                    for (k, v) in &item.fields {
                        draft.fields.insert(k.clone(), v.clone());
                    }
                    draft.slots = item
                        .media
                        .iter()
                        .map(|path| MediaSlot::Persisted { path: path.clone() })
                        .collect();
                    draft
                })
                .collect();
        }
    }

    pub fn set_field(&mut self, name: &str, value: String) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn set_item_field(&mut self, item: usize, name: &str, value: String) {
        if let Some(draft) = self.items.get_mut(item) {
            draft.fields.insert(name.to_string(), value);
        }
    }

    pub fn add_item(&mut self) {
        self.items.push(Self::blank_item(self.schema));
    }

    /// A section always keeps at least one item; removing the last one is a
    /// no-op. Returns whether anything was removed.
    pub fn remove_item(&mut self, item: usize) -> bool {
        if self.items.len() <= 1 || item >= self.items.len() {
            return false;
        }
        self.items.remove(item);
        true
    }

    /// Place a newly chosen file into `slot` of `item` (replace an existing
    /// slot, or append when `slot` is one past the end).
    pub fn set_item_file(&mut self, item: usize, slot: usize, file: FileAttachment) {
        if self.schema.item.media == MediaArity::None {
            return;
        }
        let Some(draft) = self.items.get_mut(item) else {
            return;
        };

        if let Some(existing) = draft.slots.get_mut(slot) {
            let replaces = match existing {
                MediaSlot::Persisted { path } => Some(path.clone()),
                // Re-picking over a pending file keeps the original target.
                MediaSlot::Pending { replaces, .. } => replaces.clone(),
            };
            *existing = MediaSlot::Pending { file, replaces };
        } else if slot == draft.slots.len() {
            draft.slots.push(MediaSlot::Pending {
                file,
                replaces: None,
            });
        }
    }

    /// Drop a pending choice: revert to the persisted path it replaced, or
    /// remove the slot entirely if it never had one.
    pub fn clear_item_file(&mut self, item: usize, slot: usize) {
        let Some(draft) = self.items.get_mut(item) else {
            return;
        };
        let Some(current) = draft.slots.get(slot) else {
            return;
        };

        match current {
            MediaSlot::Pending {
                replaces: Some(path),
                ..
            } => {
                draft.slots[slot] = MediaSlot::Persisted { path: path.clone() };
            }
            MediaSlot::Pending { replaces: None, .. } => {
                draft.slots.remove(slot);
            }
            MediaSlot::Persisted { .. } => {
                // Removing a persisted image is an explicit slot removal.
                draft.slots.remove(slot);
            }
        }
    }

    /// Whether the item's file input must be marked required: yes exactly
    /// when the item has no media at all — so create mode starts required,
    /// and edit mode with a persisted reference does not.
    pub fn file_input_required(&self, item: usize) -> bool {
        if self.schema.item.media == MediaArity::None {
            return false;
        }
        self.items
            .get(item)
            .map(|d| d.slots.is_empty())
            .unwrap_or(false)
    }

    /// Gate before dispatch: editing (not already submitting), required
    /// heading fields filled, and every item carrying media per its arity.
    pub fn ready_to_submit(&self) -> bool {
        if self.phase != FormPhase::Editing {
            return false;
        }

        for f in self.schema.heading_fields {
            if f.required
                && self
                    .fields
                    .get(f.name)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            {
                return false;
            }
        }

        if self.schema.item.media != MediaArity::None {
            if self.items.iter().any(|d| d.slots.is_empty()) {
                return false;
            }
        }

        true
    }

    pub fn begin_submit(&mut self) -> bool {
        if !self.ready_to_submit() {
            return false;
        }
        self.phase = FormPhase::Submitting;
        self.last_error = None;
        true
    }

    /// Failure path: the draft stays exactly as the user left it.
    pub fn submit_failed(&mut self, message: String) {
        self.phase = FormPhase::Editing;
        self.last_error = Some(message);
    }

    pub fn submit_succeeded(&mut self) {
        self.reset_draft();
        self.phase = FormPhase::Idle;
    }

    /// Cancel from Editing: discard the draft.
    pub fn cancel(&mut self) {
        self.reset_draft();
        self.phase = FormPhase::Idle;
    }

    pub fn is_open(&self) -> bool {
        self.phase != FormPhase::Idle
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Update { id } => Some(id),
            FormMode::Create => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionItem;
    use crate::schema::{CELEBRATION, STUDY_ABROAD};

    fn attachment(name: &str) -> FileAttachment {
        FileAttachment {
            name: name.to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn persisted_doc() -> SectionDocument {
        let mut fields = BTreeMap::new();
        fields.insert("heading".to_string(), "Hero".to_string());
        fields.insert("tagline".to_string(), "Tag".to_string());

        let mut item_fields = BTreeMap::new();
        item_fields.insert("title".to_string(), "A".to_string());

        SectionDocument {
            id: "sec1".to_string(),
            fields,
            items: vec![SectionItem {
                fields: item_fields,
                media: vec!["uploads/a.jpg".to_string()],
            }],
        }
    }

    #[test]
    fn test_create_mode_starts_with_one_blank_item() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();

        assert_eq!(form.phase, FormPhase::Editing);
        assert_eq!(form.mode, FormMode::Create);
        assert_eq!(form.items.len(), 1);
        assert!(form.items[0].slots.is_empty());
        assert_eq!(form.fields.get("heading").map(String::as_str), Some(""));
    }

    #[test]
    fn test_begin_edit_copies_scalars_and_maps_persisted_media() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_edit(&persisted_doc());

        assert_eq!(form.editing_id(), Some("sec1"));
        assert_eq!(form.fields.get("heading").map(String::as_str), Some("Hero"));
        assert_eq!(
            form.items[0].slots,
            vec![MediaSlot::Persisted {
                path: "uploads/a.jpg".to_string()
            }]
        );
    }

    #[test]
    fn test_remove_item_is_guarded_at_one() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();

        assert!(!form.remove_item(0), "removing the only item must be a no-op");
        assert_eq!(form.items.len(), 1);

        form.add_item();
        assert_eq!(form.items.len(), 2);
        assert!(form.remove_item(1));
        assert_eq!(form.items.len(), 1);
        assert!(!form.remove_item(0));
        assert!(form.items.len() >= 1);
    }

    #[test]
    fn test_file_required_in_create_but_not_in_edit() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();
        assert!(form.file_input_required(0), "create mode with no file is required");

        form.set_item_file(0, 0, attachment("x.jpg"));
        assert!(!form.file_input_required(0));

        form.begin_edit(&persisted_doc());
        assert!(
            !form.file_input_required(0),
            "edit mode with a persisted reference is optional"
        );
    }

    #[test]
    fn test_clearing_replacement_reverts_to_keep_existing() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_edit(&persisted_doc());

        form.set_item_file(0, 0, attachment("new.jpg"));
        assert!(form.items[0].slots[0].pending_file().is_some());

        form.clear_item_file(0, 0);
        assert_eq!(
            form.items[0].slots[0].persisted_path(),
            Some("uploads/a.jpg"),
            "dropping the replacement must restore the persisted reference"
        );
    }

    #[test]
    fn test_clearing_fresh_file_removes_the_slot() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();
        form.set_item_file(0, 0, attachment("x.jpg"));
        form.clear_item_file(0, 0);
        assert!(form.items[0].slots.is_empty());
    }

    #[test]
    fn test_gallery_appends_slots_in_order() {
        let mut form = SectionForm::new(&STUDY_ABROAD);
        form.begin_create();

        form.set_item_file(0, 0, attachment("a.jpg"));
        form.set_item_file(0, 1, attachment("b.jpg"));
        // Out-of-range beyond the end is ignored.
        form.set_item_file(0, 5, attachment("z.jpg"));

        let names: Vec<&str> = form.items[0]
            .slots
            .iter()
            .filter_map(|s| s.pending_file().map(|f| f.name.as_str()))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_submit_state_machine() {
        let mut form = SectionForm::new(&CELEBRATION);
        form.begin_create();
        form.set_field("heading", "Hero".to_string());
        form.set_field("tagline", "T".to_string());

        // Missing the mandatory file: not ready.
        assert!(!form.begin_submit());

        form.set_item_file(0, 0, attachment("x.jpg"));
        assert!(form.begin_submit());
        assert!(form.is_submitting());

        // Submitting guards a second dispatch.
        assert!(!form.begin_submit());

        form.submit_failed("HTTP 500".to_string());
        assert_eq!(form.phase, FormPhase::Editing);
        assert_eq!(form.last_error.as_deref(), Some("HTTP 500"));
        assert_eq!(
            form.fields.get("heading").map(String::as_str),
            Some("Hero"),
            "failed submit must leave the draft intact"
        );

        assert!(form.begin_submit());
        form.submit_succeeded();
        assert_eq!(form.phase, FormPhase::Idle);
        assert_eq!(form.items.len(), 1);
        assert!(form.items[0].slots.is_empty());
    }

    #[test]
    fn test_cancel_discards_draft_and_bumps_epoch() {
        let mut form = SectionForm::new(&CELEBRATION);
        let epoch = form.input_epoch;
        form.begin_edit(&persisted_doc());
        form.set_field("heading", "Changed".to_string());

        form.cancel();
        assert_eq!(form.phase, FormPhase::Idle);
        assert_eq!(form.mode, FormMode::Create);
        assert_eq!(form.fields.get("heading").map(String::as_str), Some(""));
        assert!(form.input_epoch != epoch);
    }
}
