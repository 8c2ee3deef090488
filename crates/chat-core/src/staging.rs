//! Draft retrieval filter edited in the filter dialog.
//!
//! The draft is a copy of a session's committed filter taken when the editor
//! opens. Nothing here touches the committed filter; persisting goes through
//! the registry.

use chat_types::{
    filter::{normalize_folder, RetrievalFilter},
    session::Session,
    tags::TagSet,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStaging {
    open_for: Option<String>,
    draft: RetrievalFilter,
}

impl FilterStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `session`'s filter
    pub fn open(&mut self, session: &Session) {
        self.open_for = Some(session.id.clone());
        self.draft = session.committed_filter();
    }

    pub fn close(&mut self) {
        self.open_for = None;
    }

    pub fn is_open(&self) -> bool {
        self.open_for.is_some()
    }

    /// Session the editor was opened for
    pub fn session_id(&self) -> Option<&str> {
        self.open_for.as_deref()
    }

    pub fn draft(&self) -> &RetrievalFilter {
        &self.draft
    }

    pub fn set_folder(&mut self, folder: Option<&str>) {
        self.draft.folder = normalize_folder(folder);
    }

    pub fn set_tags(&mut self, tags: TagSet) {
        self.draft.tags = tags;
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.draft.tags.insert(tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.draft.tags.remove(tag)
    }

    pub fn reset(&mut self) {
        self.draft = RetrievalFilter::default();
    }
}
