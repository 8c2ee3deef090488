//! Port traits — the boundary between the controller and the backend.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (HTTP and in-memory adapters).
//! The controller never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use chat_types::{
    Result,
    exchange::{SendRequest, SendResponse},
    message::Message,
    scope::ChatScope,
    session::{Session, SessionPatch},
};

// ─── Scope Port ──────────────────────────────────────────────

/// One scope's endpoint family, normalized to the controller's shapes.
#[async_trait(?Send)]
pub trait ScopeAdapter {
    /// Which corpus this adapter talks to
    fn scope(&self) -> ChatScope;

    /// Sessions in backend order
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    async fn create_session(&self, title: &str) -> Result<Session>;

    /// Full timeline of a session, oldest first
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>>;

    async fn update_session(&self, session_id: &str, patch: SessionPatch) -> Result<Session>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Ask a question. `None` lets the backend pick or create the session.
    async fn send_message(
        &self,
        session_id: Option<&str>,
        req: SendRequest,
    ) -> Result<SendResponse>;

    /// Every tag known across the corpus (meeting/global scopes)
    async fn known_tags(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Folders a retrieval filter may name (global scope)
    async fn filter_folders(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Tags a retrieval filter may name (global scope)
    async fn filter_tags(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Name of this adapter (for logging/debug)
    fn adapter_name(&self) -> &str;
}

// ─── Timer Port ──────────────────────────────────────────────

/// Source of delays for send timeouts
pub trait TimerPort {
    /// Resolves once `ms` milliseconds have elapsed
    fn sleep(&self, ms: u64) -> LocalBoxFuture<'static, ()>;
}
