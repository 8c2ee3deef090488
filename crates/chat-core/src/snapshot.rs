//! Read-only projection of controller state for rendering.
//! Citation titles are resolved and suggestion clickability is decided here
//! so the presentation layer only draws.

use serde::Serialize;
use chat_types::{
    citation::{CitationRecord, ContentType},
    filter::RetrievalFilter,
    message::{ContentFormat, Message, Role},
    scope::ChatScope,
    session::Session,
};
use crate::state::ControllerState;

#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    pub scope: ChatScope,
    /// Search-filtered, in list order
    pub sessions: Vec<Session>,
    pub active_session_id: Option<String>,
    pub messages: Vec<MessageView>,
    pub pending: bool,
    pub input: String,
    pub search: String,
    pub tag_vocabulary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_editor: Option<FilterEditorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub index: usize,
    pub role: Role,
    pub content: String,
    pub format: ContentFormat,
    pub sources: Vec<SourceView>,
    pub sources_expanded: bool,
    pub suggestions: Vec<String>,
    pub suggestions_actionable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub title: String,
    pub content_type: ContentType,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterEditorView {
    pub session_id: String,
    pub draft: RetrievalFilter,
    pub folders: Vec<String>,
    pub tag_options: Vec<String>,
}

impl From<&CitationRecord> for SourceView {
    fn from(c: &CitationRecord) -> Self {
        Self {
            title: c.title(),
            content_type: c.content_type.clone(),
            snippet: c.snippet.clone(),
            relevance_percent: c.relevance_percent(),
            tool_query: c.metadata.tool_query.clone(),
        }
    }
}

impl ChatSnapshot {
    pub fn capture(st: &ControllerState) -> Self {
        let pending = st.is_pending();
        let messages = st
            .timeline
            .messages()
            .iter()
            .enumerate()
            .map(|(index, msg)| message_view(st, index, msg, pending))
            .collect();

        let filter_editor = st.staging.session_id().map(|id| FilterEditorView {
            session_id: id.to_string(),
            draft: st.staging.draft().clone(),
            folders: st.filter_folders.clone(),
            tag_options: st.filter_tag_vocabulary().to_vec(),
        });

        Self {
            scope: st.scope,
            sessions: st.filtered_sessions().into_iter().cloned().collect(),
            active_session_id: st.active_id.clone(),
            messages,
            pending,
            input: st.input.clone(),
            search: st.search.clone(),
            tag_vocabulary: st.tag_vocabulary().to_vec(),
            filter_editor,
            last_error: st.last_error.clone(),
        }
    }
}

fn message_view(st: &ControllerState, index: usize, msg: &Message, pending: bool) -> MessageView {
    MessageView {
        index,
        role: msg.role,
        content: msg.content.clone(),
        format: msg.format,
        sources: msg.sources.iter().map(SourceView::from).collect(),
        sources_expanded: st.timeline.sources_expanded(index),
        suggestions: msg.follow_up_suggestions.clone(),
        suggestions_actionable: st.timeline.suggestions_actionable(index, pending),
    }
}
