//! In-memory scope backend.
//! Not persistent across page reloads. Answers questions from a small
//! document corpus by keyword overlap, which is enough for demos and tests.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use chat_core::ports::ScopeAdapter;
use chat_types::{
    ChatError, Result,
    citation::{CitationRecord, ContentType},
    exchange::{SendRequest, SendResponse},
    filter::RetrievalFilter,
    message::Message,
    scope::ChatScope,
    session::{Session, SessionPatch, PLACEHOLDER_TITLE},
    tags::TagSet,
};

const TITLE_WORDS: usize = 6;
const TITLE_CHARS: usize = 48;
const SNIPPET_CHARS: usize = 160;

/// A searchable passage
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    pub meeting_id: String,
    pub meeting_name: String,
    pub content_type: ContentType,
    pub folder: Option<String>,
    pub tags: TagSet,
    pub text: String,
}

impl MemoryDocument {
    pub fn transcript(meeting_id: &str, meeting_name: &str, text: &str) -> Self {
        Self {
            meeting_id: meeting_id.to_string(),
            meeting_name: meeting_name.to_string(),
            content_type: ContentType::Transcript,
            folder: None,
            tags: TagSet::new(),
            text: text.to_string(),
        }
    }

    pub fn in_folder(mut self, folder: &str) -> Self {
        self.folder = Some(folder.to_string());
        self
    }

    pub fn tagged(mut self, tags: &str) -> Self {
        self.tags = TagSet::parse_csv(tags);
        self
    }

    fn admits(&self, filter: Option<&RetrievalFilter>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        if let Some(folder) = &filter.folder {
            if self.folder.as_deref() != Some(folder.as_str()) {
                return false;
            }
        }
        filter.tags.is_empty() || filter.tags.iter().any(|t| self.tags.contains(t))
    }

    /// Fraction of the query's words found in the text
    fn score(&self, query: &[String]) -> f32 {
        if query.is_empty() {
            return 0.0;
        }
        let words = keywords(&self.text);
        let hits = query.iter().filter(|q| words.contains(*q)).count();
        hits as f32 / query.len() as f32
    }

    fn cite(&self, similarity: f32) -> CitationRecord {
        CitationRecord {
            content_type: self.content_type.clone(),
            similarity: Some(similarity),
            snippet: truncate(&self.text, SNIPPET_CHARS),
            meeting_id: Some(self.meeting_id.clone()),
            meeting_name: Some(self.meeting_name.clone()),
            ..CitationRecord::default()
        }
    }
}

pub struct MemoryBackend {
    scope: ChatScope,
    sessions: RefCell<Vec<Session>>,
    messages: RefCell<HashMap<String, Vec<Message>>>,
    documents: RefCell<Vec<MemoryDocument>>,
}

impl MemoryBackend {
    pub fn new(scope: ChatScope) -> Self {
        Self {
            scope,
            sessions: RefCell::new(Vec::new()),
            messages: RefCell::new(HashMap::new()),
            documents: RefCell::new(Vec::new()),
        }
    }

    pub fn add_document(&self, doc: MemoryDocument) {
        self.documents.borrow_mut().push(doc);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.borrow().len()
    }

    fn insert_session(&self, title: &str) -> Session {
        let session = Session::new(Uuid::new_v4().to_string(), self.scope, title);
        self.sessions.borrow_mut().insert(0, session.clone());
        self.messages.borrow_mut().insert(session.id.clone(), Vec::new());
        log::debug!("[memory] Created session {}", session.id);
        session
    }

    fn search(&self, req: &SendRequest) -> Vec<CitationRecord> {
        let query = keywords(&req.text);
        let filter = req.filter.as_ref().filter(|_| self.scope.supports_filters());
        let mut scored: Vec<(f32, CitationRecord)> = self
            .documents
            .borrow()
            .iter()
            .filter(|doc| doc.admits(filter))
            .filter_map(|doc| {
                let score = doc.score(&query);
                (score > 0.0).then(|| (score, doc.cite(score)))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(req.top_k);
        scored.into_iter().map(|(_, c)| c).collect()
    }

    fn compose(&self, sources: &[CitationRecord]) -> (String, Vec<String>) {
        if sources.is_empty() {
            return (
                "I couldn't find anything relevant to that question.".to_string(),
                Vec::new(),
            );
        }
        let mut content = String::from("Here is what I found:\n");
        for source in sources {
            content.push_str(&format!("\n- **{}**: {}", source.title(), source.snippet));
        }
        let suggestions = vec![format!("What else was discussed in {}?", sources[0].title())];
        (content, suggestions)
    }
}

#[async_trait(?Send)]
impl ScopeAdapter for MemoryBackend {
    fn scope(&self) -> ChatScope {
        self.scope
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.borrow().clone())
    }

    async fn create_session(&self, title: &str) -> Result<Session> {
        Ok(self.insert_session(title))
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        self.messages
            .borrow()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))
    }

    async fn update_session(&self, session_id: &str, patch: SessionPatch) -> Result<Session> {
        let mut sessions = self.sessions.borrow_mut();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;
        if let Some(title) = patch.title {
            session.title = title;
        }
        if let Some(tags) = patch.tags.filter(|_| self.scope.supports_tags()) {
            session.tags = tags;
        }
        if let Some(filter) = patch.filter.filter(|_| self.scope.supports_filters()) {
            session.filter_folder = filter.folder;
            session.filter_tags = filter.tags;
        }
        session.updated_at = Some(Utc::now());
        Ok(session.clone())
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.borrow_mut();
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        if sessions.len() == before {
            return Err(ChatError::SessionNotFound(session_id.to_string()));
        }
        self.messages.borrow_mut().remove(session_id);
        Ok(())
    }

    async fn send_message(&self, session_id: Option<&str>, req: SendRequest) -> Result<SendResponse> {
        let id = match session_id {
            Some(id) => id.to_string(),
            None => self.insert_session(PLACEHOLDER_TITLE).id,
        };

        let sources = self.search(&req);
        let (content, suggestions) = self.compose(&sources);
        let reply = Message::assistant(content.clone())
            .with_sources(sources.clone())
            .with_suggestions(suggestions.clone());

        {
            let mut sessions = self.sessions.borrow_mut();
            let position = sessions
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| ChatError::SessionNotFound(id.clone()))?;
            let mut session = sessions.remove(position);
            if session.is_unrefreshed() {
                session.title = title_from(&req.text);
            }
            session.message_count += 2;
            session.updated_at = Some(Utc::now());
            sessions.insert(0, session);
        }
        self.messages
            .borrow_mut()
            .entry(id.clone())
            .or_default()
            .extend([Message::user(req.text.as_str()), reply]);

        Ok(SendResponse {
            content,
            sources: Some(sources),
            follow_up_suggestions: Some(suggestions),
            session_id: Some(id),
        })
    }

    async fn known_tags(&self) -> Result<Vec<String>> {
        let mut tags = TagSet::new();
        for session in self.sessions.borrow().iter() {
            tags.extend_from(&session.tags);
        }
        for doc in self.documents.borrow().iter() {
            tags.extend_from(&doc.tags);
        }
        Ok(tags.to_vec())
    }

    async fn filter_folders(&self) -> Result<Vec<String>> {
        let mut folders: Vec<String> = self
            .documents
            .borrow()
            .iter()
            .filter_map(|d| d.folder.clone())
            .collect();
        folders.sort();
        folders.dedup();
        Ok(folders)
    }

    async fn filter_tags(&self) -> Result<Vec<String>> {
        let mut tags = TagSet::new();
        for doc in self.documents.borrow().iter() {
            tags.extend_from(&doc.tags);
        }
        Ok(tags.to_vec())
    }

    fn adapter_name(&self) -> &str {
        "memory"
    }
}

/// Lowercased words of three or more characters
fn keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// A session title from the opening question
pub fn title_from(question: &str) -> String {
    let words: Vec<&str> = question.split_whitespace().take(TITLE_WORDS).collect();
    let title = truncate(&words.join(" "), TITLE_CHARS);
    if title.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        title
    }
}

fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}
