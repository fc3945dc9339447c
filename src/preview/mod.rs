use crate::models::{FileAttachment, SectionDocument};
use crate::util::resolve_media_url;

/// The preview-URL primitive, kept behind a trait so the lifecycle rules can
/// be verified with a counting stub off-browser.
pub(crate) trait PreviewUrlFactory {
    fn create(&self, file: &FileAttachment) -> String;
    fn revoke(&self, url: &str);
}

/// Browser implementation over `URL.createObjectURL` / `revokeObjectURL`.
pub(crate) struct ObjectUrls;

impl PreviewUrlFactory for ObjectUrls {
    fn create(&self, file: &FileAttachment) -> String {
        let array = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let options = web_sys::BlobPropertyBag::new();
        options.set_type(&file.mime);

        web_sys::Blob::new_with_buffer_source_sequence_and_options(&parts, &options)
            .ok()
            .and_then(|blob| web_sys::Url::create_object_url_with_blob(&blob).ok())
            .unwrap_or_default()
    }

    fn revoke(&self, url: &str) {
        let _ = web_sys::Url::revoke_object_url(url);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PreviewSource {
    /// Resolved from a persisted backend path; not a locally owned resource.
    Persisted,
    /// Derived from a locally chosen file; must be revoked exactly once.
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Preview {
    pub url: String,
    pub source: PreviewSource,
}

/// Preview slots mirroring the form's (item, slot) indexing.
///
/// Ownership rule: every Local preview is revoked exactly once — when its
/// slot is replaced or removed, when the owning item goes away, on reset, or
/// on manager teardown, whichever comes first. Persisted previews are never
/// revoked.
pub(crate) struct PreviewManager<F: PreviewUrlFactory> {
    factory: F,
    items: Vec<Vec<Preview>>,
    /// Persisted media count per item as originally loaded; slots below this
    /// index render with the "existing" badge.
    existing_counts: Vec<usize>,
}

impl<F: PreviewUrlFactory> PreviewManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            items: vec![Vec::new()],
            existing_counts: vec![0],
        }
    }

    fn revoke_preview(&self, p: &Preview) {
        if p.source == PreviewSource::Local {
            self.factory.revoke(&p.url);
        }
    }

    /// Fresh create-mode layout: one item, no previews.
    pub fn init_create(&mut self) {
        self.reset();
    }

    /// Edit-mode layout: persisted paths resolved against the asset base.
    pub fn init_edit(&mut self, existing: &SectionDocument, asset_base: &str) {
        self.reset();

        if existing.items.is_empty() {
            return;
        }

        self.items = existing
            .items
            .iter()
            .map(|item| {
                item.media
                    .iter()
                    .map(|path| Preview {
                        url: resolve_media_url(asset_base, path),
                        source: PreviewSource::Persisted,
                    })
                    .collect()
            })
            .collect();
        self.existing_counts = existing.items.iter().map(|i| i.media.len()).collect();
    }

    pub fn add_item(&mut self) {
        self.items.push(Vec::new());
        self.existing_counts.push(0);
    }

    pub fn remove_item(&mut self, item: usize) {
        if self.items.len() <= 1 || item >= self.items.len() {
            return;
        }
        for p in &self.items[item] {
            self.revoke_preview(p);
        }
        self.items.remove(item);
        self.existing_counts.remove(item);
    }

    /// A file was chosen for `slot`: release any local preview it replaces
    /// and derive a new one.
    pub fn set_local(&mut self, item: usize, slot: usize, file: &FileAttachment) {
        let url = self.factory.create(file);
        let preview = Preview {
            url,
            source: PreviewSource::Local,
        };

        let Some(slots) = self.items.get_mut(item) else {
            self.factory.revoke(&preview.url);
            return;
        };

        if slot < slots.len() {
            let old = std::mem::replace(&mut slots[slot], preview);
            self.revoke_preview(&old);
        } else if slot == slots.len() {
            slots.push(preview);
        } else {
            self.factory.revoke(&preview.url);
        }
    }

    /// The pending choice was dropped: release the local preview and either
    /// restore the persisted one (`restore_url`) or remove the slot.
    pub fn clear_local(&mut self, item: usize, slot: usize, restore_url: Option<String>) {
        let Some(slots) = self.items.get_mut(item) else {
            return;
        };
        if slot >= slots.len() {
            return;
        }

        match restore_url {
            Some(url) => {
                let old = std::mem::replace(
                    &mut slots[slot],
                    Preview {
                        url,
                        source: PreviewSource::Persisted,
                    },
                );
                self.revoke_preview(&old);
            }
            None => {
                let old = slots.remove(slot);
                self.revoke_preview(&old);
            }
        }
    }

    /// Release every local preview and return to the create-mode layout.
    pub fn reset(&mut self) {
        for slots in &self.items {
            for p in slots {
                self.revoke_preview(p);
            }
        }
        self.items = vec![Vec::new()];
        self.existing_counts = vec![0];
    }

    pub fn preview(&self, item: usize, slot: usize) -> Option<&Preview> {
        self.items.get(item).and_then(|slots| slots.get(slot))
    }

    pub fn previews(&self, item: usize) -> &[Preview] {
        self.items.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the slot index falls within the originally loaded persisted
    /// media for this item ("existing" badge vs "new").
    pub fn is_existing(&self, item: usize, slot: usize) -> bool {
        slot < self.existing_counts.get(item).copied().unwrap_or(0)
    }
}

impl<F: PreviewUrlFactory> Drop for PreviewManager<F> {
    fn drop(&mut self) {
        self.reset();
    }
}
