use crate::models::SectionDocument;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// In-memory collection for one page's sections.
///
/// A failed load keeps whatever was loaded before (stale-but-present) so the
/// list never blanks out underneath the user; the error rides alongside.
#[derive(Clone, Debug)]
pub(crate) struct CollectionStore {
    pub sections: Vec<SectionDocument>,
    pub state: LoadState,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            state: LoadState::Idle,
        }
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn apply_loaded(&mut self, sections: Vec<SectionDocument>) {
        self.sections = sections;
        self.state = LoadState::Loaded;
    }

    pub fn apply_failed(&mut self, message: String) {
        // Intentionally leaves `sections` untouched.
        self.state = LoadState::Failed(message);
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(m) => Some(m),
            _ => None,
        }
    }

    pub fn find(&self, id: &str) -> Option<&SectionDocument> {
        self.sections.iter().find(|s| s.id == id)
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn doc(id: &str) -> SectionDocument {
        SectionDocument {
            id: id.to_string(),
            fields: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_load_cycle() {
        let mut store = CollectionStore::new();
        assert_eq!(store.state, LoadState::Idle);

        store.begin_load();
        assert!(store.is_loading());

        store.apply_loaded(vec![doc("a"), doc("b")]);
        assert_eq!(store.state, LoadState::Loaded);
        assert_eq!(store.sections.len(), 2);
        assert!(store.find("b").is_some());
    }

    #[test]
    fn test_failed_load_keeps_last_good_sections() {
        let mut store = CollectionStore::new();
        store.apply_loaded(vec![doc("a")]);

        store.begin_load();
        store.apply_failed("backend unreachable".to_string());

        assert_eq!(store.sections.len(), 1, "stale sections must survive a failed reload");
        assert_eq!(store.error(), Some("backend unreachable"));
        assert!(!store.is_loading());
    }
}
