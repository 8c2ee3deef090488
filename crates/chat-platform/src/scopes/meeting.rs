//! Chat scoped to a single meeting's transcript, summary and notes.

use async_trait::async_trait;

use chat_core::ports::ScopeAdapter;
use chat_types::{
    config::BackendConfig,
    exchange::{SendRequest, SendResponse},
    message::Message,
    scope::ChatScope,
    session::{Session, SessionPatch},
    Result,
};

use super::{segment, SessionRoutes};

pub struct MeetingChatAdapter {
    routes: SessionRoutes,
    name: String,
}

impl MeetingChatAdapter {
    pub fn new(backend: BackendConfig, meeting_id: &str) -> Self {
        let base = format!("meetings/{}/chat", segment(meeting_id));
        Self {
            routes: SessionRoutes::new(
                backend,
                ChatScope::Meeting,
                format!("{}/sessions", base),
                format!("{}/ask", base),
            ),
            name: format!("meeting:{}", meeting_id),
        }
    }
}

#[async_trait(?Send)]
impl ScopeAdapter for MeetingChatAdapter {
    fn scope(&self) -> ChatScope {
        ChatScope::Meeting
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.routes.list().await
    }

    async fn create_session(&self, title: &str) -> Result<Session> {
        self.routes.create(title).await
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let (_, messages) = self.routes.detail(session_id).await?;
        Ok(messages)
    }

    async fn update_session(&self, session_id: &str, patch: SessionPatch) -> Result<Session> {
        self.routes.update(session_id, &patch).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.routes.delete(session_id).await
    }

    async fn send_message(&self, session_id: Option<&str>, req: SendRequest) -> Result<SendResponse> {
        self.routes.ask(session_id, &req).await
    }

    async fn known_tags(&self) -> Result<Vec<String>> {
        self.routes.vocabulary("chat/tags").await
    }

    fn adapter_name(&self) -> &str {
        &self.name
    }
}
