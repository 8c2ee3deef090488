//! Chat scoped to a project: every meeting and document filed under it.
//! Project sessions carry no tags and no retrieval filter.

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

use crate::dto::MessageDto;
use super::{segment, SessionRoutes};

pub struct ProjectChatAdapter {
    routes: SessionRoutes,
    name: String,
}

impl ProjectChatAdapter {
    pub fn new(backend: BackendConfig, project_id: &str) -> Self {
        let base = format!("projects/{}/chat", segment(project_id));
        Self {
            routes: SessionRoutes::new(
                backend,
                ChatScope::Project,
                format!("{}/sessions", base),
                format!("{}/ask", base),
            ),
            name: format!("project:{}", project_id),
        }
    }
}

#[async_trait(?Send)]
impl ScopeAdapter for ProjectChatAdapter {
    fn scope(&self) -> ChatScope {
        ChatScope::Project
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.routes.list().await
    }

    async fn create_session(&self, title: &str) -> Result<Session> {
        self.routes.create(title).await
    }

    /// Project sessions expose their timeline on a separate endpoint
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let path = format!("{}/messages", self.routes.session_path(session_id));
        let messages: Vec<MessageDto> = self.routes.http().get(&path).await?;
        Ok(messages.into_iter().map(MessageDto::into_message).collect())
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

    fn adapter_name(&self) -> &str {
        &self.name
    }
}
