use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::filter::RetrievalFilter;
use crate::scope::ChatScope;
use crate::tags::TagSet;

/// Title the backend gives a session until it picks a descriptive one
pub const PLACEHOLDER_TITLE: &str = "New chat";

/// A named, persistent conversation thread within a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub scope: ChatScope,
    pub title: String,
    /// Meeting and global scopes only
    #[serde(default)]
    pub tags: TagSet,
    /// Global scope only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_folder: Option<String>,
    /// Global scope only
    #[serde(default)]
    pub filter_tags: TagSet,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: impl Into<String>, scope: ChatScope, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            title: title.into(),
            tags: TagSet::new(),
            filter_folder: None,
            filter_tags: TagSet::new(),
            message_count: 0,
            updated_at: Some(Utc::now()),
        }
    }

    /// Still carrying the placeholder title; the backend has not retitled it
    pub fn is_unrefreshed(&self) -> bool {
        self.title == PLACEHOLDER_TITLE
    }

    /// The filter persisted on this session and sent with each query
    pub fn committed_filter(&self) -> RetrievalFilter {
        RetrievalFilter::new(self.filter_folder.as_deref(), self.filter_tags.clone())
    }

    /// Case-insensitive match against title and tags; a blank query matches all
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Fields to change on a session. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub tags: Option<TagSet>,
    /// `Some(empty)` clears a persisted filter
    pub filter: Option<RetrievalFilter>,
}

impl SessionPatch {
    pub fn rename(title: impl Into<String>, tags: Option<TagSet>) -> Self {
        Self {
            title: Some(title.into()),
            tags,
            filter: None,
        }
    }

    pub fn filter(filter: RetrievalFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }
}
