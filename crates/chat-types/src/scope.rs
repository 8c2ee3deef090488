use serde::{Deserialize, Serialize};

/// The corpus a chat session is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatScope {
    /// One meeting transcript
    Meeting,
    /// Every document inside a project
    Project,
    /// The entire corpus, optionally narrowed by a retrieval filter
    Global,
}

impl ChatScope {
    /// Sessions in this scope carry free-text tags
    pub fn supports_tags(&self) -> bool {
        matches!(self, ChatScope::Meeting | ChatScope::Global)
    }

    /// Sessions in this scope carry a persisted folder/tag retrieval filter
    pub fn supports_filters(&self) -> bool {
        matches!(self, ChatScope::Global)
    }

    pub fn label(&self) -> &str {
        match self {
            ChatScope::Meeting => "meeting",
            ChatScope::Project => "project",
            ChatScope::Global => "global",
        }
    }

    pub fn all() -> &'static [ChatScope] {
        &[ChatScope::Meeting, ChatScope::Project, ChatScope::Global]
    }
}
