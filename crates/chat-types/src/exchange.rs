//! Request/response shapes for one question sent to the RAG backend.

use serde::{Deserialize, Serialize};
use crate::citation::CitationRecord;
use crate::filter::RetrievalFilter;
use crate::message::{Message, Role};

/// One prior turn passed to the backend as conversational context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryTurn {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// A question plus everything the backend needs to answer it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendRequest {
    pub text: String,
    pub history: Vec<HistoryTurn>,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<RetrievalFilter>,
}

/// Trailing `window` messages of a timeline as history turns
pub fn history_window(messages: &[Message], window: usize) -> Vec<HistoryTurn> {
    let start = messages.len().saturating_sub(window);
    messages[start..].iter().map(HistoryTurn::from).collect()
}

/// The backend's answer. Absent lists stay `None` until the controller
/// defaults them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SendResponse {
    pub content: String,
    #[serde(default)]
    pub sources: Option<Vec<CitationRecord>>,
    #[serde(default)]
    pub follow_up_suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SendResponse {
    pub fn into_message(self) -> Message {
        Message::assistant(self.content)
            .with_sources(self.sources.unwrap_or_default())
            .with_suggestions(self.follow_up_suggestions.unwrap_or_default())
    }
}
