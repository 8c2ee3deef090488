use serde::{Deserialize, Serialize};
use crate::citation::CitationRecord;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How the presentation layer should treat `content`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Markdown,
    Plain,
}

/// Shown in place of a reply when the backend could not be reached
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't fetch a response right now. Please try again.";

/// A single message in a session timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub format: ContentFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<CitationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_suggestions: Vec<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            format: ContentFormat::Plain,
            sources: Vec::new(),
            follow_up_suggestions: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            format: ContentFormat::Markdown,
            sources: Vec::new(),
            follow_up_suggestions: Vec::new(),
        }
    }

    /// The synthetic reply appended when a send fails or times out
    pub fn fallback() -> Self {
        Self {
            format: ContentFormat::Plain,
            ..Self::assistant(FALLBACK_REPLY)
        }
    }

    pub fn with_sources(mut self, sources: Vec<CitationRecord>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.follow_up_suggestions = suggestions;
        self
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
