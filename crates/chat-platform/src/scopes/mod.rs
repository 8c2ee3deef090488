//! HTTP scope adapters. Each scope is a thin wrapper around [`SessionRoutes`],
//! which knows the session collection and ask endpoints of one scope.

pub mod meeting;
pub mod project;
pub mod global;

pub use meeting::MeetingChatAdapter;
pub use project::ProjectChatAdapter;
pub use global::GlobalChatAdapter;

use serde_json::Value;

use chat_types::{
    config::BackendConfig,
    exchange::{SendRequest, SendResponse},
    message::Message,
    scope::ChatScope,
    session::{Session, SessionPatch},
    Result,
};

use crate::dto::{self, AskReplyDto, SessionDto, VocabularyDto};
use crate::http::HttpClient;

/// Endpoints shared by every scope: `{sessions}` lists and creates,
/// `{sessions}/{id}` patches and deletes, `{ask}` answers questions.
pub(crate) struct SessionRoutes {
    http: HttpClient,
    scope: ChatScope,
    sessions: String,
    ask: String,
}

impl SessionRoutes {
    pub(crate) fn new(backend: BackendConfig, scope: ChatScope, sessions: String, ask: String) -> Self {
        Self {
            http: HttpClient::new(backend),
            scope,
            sessions,
            ask,
        }
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    pub(crate) fn session_path(&self, id: &str) -> String {
        format!("{}/{}", self.sessions, segment(id))
    }

    pub(crate) async fn list(&self) -> Result<Vec<Session>> {
        let sessions: Vec<SessionDto> = self.http.get(&self.sessions).await?;
        Ok(sessions
            .into_iter()
            .map(|dto| dto.into_session(self.scope))
            .collect())
    }

    pub(crate) async fn create(&self, title: &str) -> Result<Session> {
        let dto: SessionDto = self.http.post(&self.sessions, &dto::create_body(title)).await?;
        Ok(dto.into_session(self.scope))
    }

    /// Session detail with its embedded timeline
    pub(crate) async fn detail(&self, id: &str) -> Result<(Session, Vec<Message>)> {
        let mut dto: SessionDto = self.http.get(&self.session_path(id)).await?;
        let messages = dto.take_messages();
        Ok((dto.into_session(self.scope), messages))
    }

    pub(crate) async fn update(&self, id: &str, patch: &SessionPatch) -> Result<Session> {
        let body = dto::patch_body(patch, self.scope);
        let dto: SessionDto = self.http.patch(&self.session_path(id), &body).await?;
        Ok(dto.into_session(self.scope))
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<()> {
        self.http.delete(&self.session_path(id)).await
    }

    pub(crate) async fn ask(&self, session_id: Option<&str>, req: &SendRequest) -> Result<SendResponse> {
        let body: Value = dto::ask_body(session_id, req, self.scope);
        let reply: AskReplyDto = self.http.post(&self.ask, &body).await?;
        Ok(reply.into())
    }

    pub(crate) async fn vocabulary(&self, path: &str) -> Result<Vec<String>> {
        let dto: VocabularyDto = self.http.get(path).await?;
        Ok(dto.into_items())
    }
}

/// Percent-encode a path segment. Spaces become `%20`; a literal `+`
/// is already escaped as `%2B`.
pub(crate) fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
