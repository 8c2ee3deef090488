//! Wire types for the chat backend and their conversion into domain types.
//!
//! Session tags travel as comma-joined strings, filter tags as arrays.
//! Ids may arrive as numbers or strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use chat_types::{
    citation::CitationRecord,
    exchange::{SendRequest, SendResponse},
    message::{Message, Role},
    scope::ChatScope,
    session::{Session, SessionPatch, PLACEHOLDER_TITLE},
    tags::{self, TagSet},
};

// ─── Sessions ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SessionDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, with = "tags::csv")]
    pub tags: TagSet,
    #[serde(default)]
    pub filter_folder: Option<String>,
    #[serde(default)]
    pub filter_tags: TagSet,
    #[serde(default)]
    pub message_count: Option<u32>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Present when the detail endpoint embeds the timeline
    #[serde(default)]
    pub messages: Option<Vec<MessageDto>>,
}

impl SessionDto {
    /// Drop fields the scope does not carry and default the title
    pub fn into_session(self, scope: ChatScope) -> Session {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
        let mut session = Session::new(self.id, scope, title);
        session.message_count = self
            .message_count
            .or_else(|| self.messages.as_ref().map(|m| m.len() as u32))
            .unwrap_or(0);
        session.updated_at = self.updated_at;
        if scope.supports_tags() {
            session.tags = self.tags;
        }
        if scope.supports_filters() {
            session.filter_folder = self
                .filter_folder
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty());
            session.filter_tags = self.filter_tags;
        }
        session
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        self.messages
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(MessageDto::into_message)
            .collect()
    }
}

/// Body for creating a session
pub fn create_body(title: &str) -> Value {
    json!({ "title": title })
}

/// Body for PATCHing a session. Only the fields set in `patch` are sent;
/// an applied filter always sends both filter fields so clearing reaches
/// the backend as `null` / `[]`.
pub fn patch_body(patch: &SessionPatch, scope: ChatScope) -> Value {
    let mut body = json!({});
    if let Some(title) = &patch.title {
        body["title"] = json!(title);
    }
    if let Some(tags) = patch.tags.as_ref().filter(|_| scope.supports_tags()) {
        body["tags"] = json!(tags.to_csv());
    }
    if let Some(filter) = patch.filter.as_ref().filter(|_| scope.supports_filters()) {
        body["filter_folder"] = json!(filter.folder);
        body["filter_tags"] = json!(filter.tags.to_vec());
    }
    body
}

// ─── Messages ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sources: Option<Vec<CitationRecord>>,
    #[serde(default)]
    pub follow_up_suggestions: Option<Vec<String>>,
}

impl MessageDto {
    pub fn into_message(self) -> Message {
        if self.role.eq_ignore_ascii_case("user") {
            return Message::user(self.content);
        }
        Message::assistant(self.content)
            .with_sources(self.sources.unwrap_or_default())
            .with_suggestions(self.follow_up_suggestions.unwrap_or_default())
    }
}

// ─── Ask ─────────────────────────────────────────────────────

/// Body for the scope's ask endpoint
pub fn ask_body(session_id: Option<&str>, req: &SendRequest, scope: ChatScope) -> Value {
    let history: Vec<Value> = req
        .history
        .iter()
        .map(|turn| {
            json!({
                "role": match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                "content": turn.content,
            })
        })
        .collect();

    let mut body = json!({
        "question": req.text,
        "chat_history": history,
        "top_k": req.top_k,
    });
    if let Some(id) = session_id {
        body["session_id"] = json!(id);
    }
    if let Some(filter) = req.filter.as_ref().filter(|_| scope.supports_filters()) {
        if let Some(folder) = &filter.folder {
            body["filter_folder"] = json!(folder);
        }
        if !filter.tags.is_empty() {
            body["filter_tags"] = json!(filter.tags.to_vec());
        }
    }
    body
}

#[derive(Debug, Deserialize)]
pub struct AskReplyDto {
    #[serde(alias = "answer", alias = "response")]
    pub content: String,
    #[serde(default)]
    pub sources: Option<Vec<CitationRecord>>,
    #[serde(default)]
    pub follow_up_suggestions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub session_id: Option<String>,
}

impl From<AskReplyDto> for SendResponse {
    fn from(dto: AskReplyDto) -> Self {
        SendResponse {
            content: dto.content,
            sources: dto.sources,
            follow_up_suggestions: dto.follow_up_suggestions,
            session_id: dto.session_id,
        }
    }
}

// ─── Vocabularies ────────────────────────────────────────────

/// Either a bare array or `{ "tags": [...] }` / `{ "folders": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VocabularyDto {
    Plain(Vec<String>),
    Wrapped {
        #[serde(alias = "tags", alias = "folders")]
        items: Vec<String>,
    },
}

impl VocabularyDto {
    /// Trimmed, blank-free, first occurrence wins
    pub fn into_items(self) -> Vec<String> {
        let raw = match self {
            VocabularyDto::Plain(items) => items,
            VocabularyDto::Wrapped { items } => items,
        };
        let mut out: Vec<String> = Vec::with_capacity(raw.len());
        for item in raw {
            let item = item.trim();
            if !item.is_empty() && !out.iter().any(|o| o == item) {
                out.push(item.to_string());
            }
        }
        out
    }
}

// ─── Id helpers ──────────────────────────────────────────────

fn id_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_to_string(value).ok_or_else(|| serde::de::Error::custom("id must be a string or a number"))
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(id_to_string).filter(|s| !s.is_empty()))
}
