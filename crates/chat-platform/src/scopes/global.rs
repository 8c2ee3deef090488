//! Chat across the whole corpus. Global sessions carry tags and a
//! persisted retrieval filter (folder + tags) sent with every question.

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

use super::SessionRoutes;

pub struct GlobalChatAdapter {
    routes: SessionRoutes,
}

impl GlobalChatAdapter {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            routes: SessionRoutes::new(
                backend,
                ChatScope::Global,
                "global-chat/sessions".to_string(),
                "global-chat/ask".to_string(),
            ),
        }
    }
}

#[async_trait(?Send)]
impl ScopeAdapter for GlobalChatAdapter {
    fn scope(&self) -> ChatScope {
        ChatScope::Global
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

    async fn filter_folders(&self) -> Result<Vec<String>> {
        self.routes.vocabulary("global-chat/filters/folders").await
    }

    async fn filter_tags(&self) -> Result<Vec<String>> {
        self.routes.vocabulary("global-chat/filters/tags").await
    }

    fn adapter_name(&self) -> &str {
        "global"
    }
}
