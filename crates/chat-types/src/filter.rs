use serde::{Deserialize, Serialize};
use crate::tags::TagSet;

/// Folder/tag constraints narrowing which documents may be cited.
/// Tags are OR-combined by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
}

impl RetrievalFilter {
    /// Build a filter, trimming the folder and dropping it when blank
    pub fn new(folder: Option<&str>, tags: TagSet) -> Self {
        Self {
            folder: normalize_folder(folder),
            tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folder.is_none() && self.tags.is_empty()
    }
}

pub fn normalize_folder(folder: Option<&str>) -> Option<String> {
    folder
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}
