//! Declarative descriptors for the editable page sections.
//!
//! Every marketing page follows the same shape: a handful of scalar heading
//! fields plus an ordered list of repeatable items, each item owning zero or
//! more media files. One schema per page drives the generic CollectionEditor
//! instead of a hand-written editor per content type.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Textarea,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Text,
        required: true,
    }
}

const fn textarea(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Textarea,
        required: false,
    }
}

/// How many media slots an item of this shape owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MediaArity {
    None,
    Single,
    Gallery,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ItemShape {
    /// What one item is called in the UI ("Event", "Program", ...).
    pub noun: &'static str,
    pub fields: &'static [FieldSpec],
    pub media: MediaArity,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SectionSchema {
    /// Stable key, also used for route paths and storage keys.
    pub key: &'static str,
    pub title: &'static str,
    /// Collection path on the backend, e.g. `/api/celebration`.
    pub collection_path: &'static str,
    pub heading_fields: &'static [FieldSpec],
    pub item: ItemShape,
    /// Multipart field carrying the JSON-serialized item array.
    pub items_part: &'static str,
    /// Shared multipart field for the binary file parts, in item order.
    pub files_part: &'static str,
}

pub(crate) static CELEBRATION: SectionSchema = SectionSchema {
    key: "celebration",
    title: "Celebration",
    collection_path: "/api/celebration",
    heading_fields: &[
        text("heading", "Heading"),
        text("tagline", "Tagline"),
        textarea("description", "Description"),
    ],
    item: ItemShape {
        noun: "Event",
        fields: &[text("title", "Title"), textarea("description", "Description")],
        media: MediaArity::Single,
    },
    items_part: "items",
    files_part: "images",
};

pub(crate) static PRIVATE_CHARTER: SectionSchema = SectionSchema {
    key: "private-charter",
    title: "Private Charter",
    collection_path: "/api/private-charter",
    heading_fields: &[text("heading", "Heading"), textarea("intro", "Intro")],
    item: ItemShape {
        noun: "Feature",
        fields: &[text("title", "Title"), textarea("description", "Description")],
        media: MediaArity::Single,
    },
    items_part: "items",
    files_part: "images",
};

pub(crate) static SPORT: SectionSchema = SectionSchema {
    key: "sport",
    title: "Sport",
    collection_path: "/api/sport",
    heading_fields: &[text("heading", "Heading"), text("subheading", "Subheading")],
    item: ItemShape {
        noun: "Activity",
        fields: &[text("title", "Title"), textarea("description", "Description")],
        media: MediaArity::Single,
    },
    items_part: "items",
    files_part: "images",
};

pub(crate) static STUDY_ABROAD: SectionSchema = SectionSchema {
    key: "study-abroad",
    title: "Study Abroad",
    collection_path: "/api/study-abroad",
    heading_fields: &[text("heading", "Heading"), textarea("intro", "Intro")],
    item: ItemShape {
        noun: "Program",
        fields: &[
            text("title", "Title"),
            text("duration", "Duration"),
            textarea("description", "Description"),
        ],
        // Programs carry a photo gallery rather than one cover image.
        media: MediaArity::Gallery,
    },
    items_part: "items",
    files_part: "images",
};

pub(crate) static VOYAGE: SectionSchema = SectionSchema {
    key: "voyage",
    title: "Voyage",
    collection_path: "/api/voyage",
    heading_fields: &[
        text("heading", "Heading"),
        text("subheading", "Subheading"),
        textarea("description", "Description"),
    ],
    item: ItemShape {
        noun: "Stop",
        fields: &[text("title", "Title"), textarea("description", "Description")],
        media: MediaArity::Single,
    },
    items_part: "items",
    files_part: "images",
};

/// All editable sections, in sidebar order.
pub(crate) static ALL_SECTIONS: &[&SectionSchema] = &[
    &CELEBRATION,
    &PRIVATE_CHARTER,
    &SPORT,
    &STUDY_ABROAD,
    &VOYAGE,
];
