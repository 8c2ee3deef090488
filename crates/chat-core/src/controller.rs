//! Chat controller — one instance per open scope (meeting, project, global).
//!
//! Composes the session registry, the send pipeline and the filter editor
//! over a single [`ScopeAdapter`]. Clone-cheap; every clone drives the same
//! state. Instances never share state with each other.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use chat_types::{
    ChatError, Result,
    config::ChatConfig,
    event::ChatEvent,
    session::Session,
    tags::TagSet,
};
use crate::event_bus::EventBus;
use crate::exchange::{MessageExchangeController, SendOutcome};
use crate::ports::{ScopeAdapter, TimerPort};
use crate::registry::SessionRegistry;
use crate::snapshot::ChatSnapshot;
use crate::state::{ControllerState, SharedState};

#[derive(Clone)]
pub struct ChatController {
    state: SharedState,
    events: EventBus,
    registry: SessionRegistry,
    exchange: MessageExchangeController,
}

impl ChatController {
    pub fn new(adapter: Rc<dyn ScopeAdapter>, timer: Rc<dyn TimerPort>, config: ChatConfig) -> Self {
        let events = EventBus::new();
        let state: SharedState = Rc::new(RefCell::new(ControllerState::new(adapter.scope())));
        let registry = SessionRegistry::new(adapter.clone(), state.clone(), events.clone());
        let exchange = MessageExchangeController::new(
            adapter,
            registry.clone(),
            state.clone(),
            events.clone(),
            timer,
            config,
        );
        Self {
            state,
            events,
            registry,
            exchange,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn exchange(&self) -> &MessageExchangeController {
        &self.exchange
    }

    /// Borrow the current state. Do not hold the borrow across an `.await`.
    pub fn state(&self) -> Ref<'_, ControllerState> {
        self.state.borrow()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot::capture(&self.state.borrow())
    }

    // ─── Sessions ────────────────────────────────────────────

    pub async fn load(&self) {
        self.registry.load().await
    }

    pub async fn list_sessions(&self) -> Vec<Session> {
        self.registry.list_sessions().await
    }

    pub async fn select_session(&self, id: &str) -> Result<()> {
        self.registry.select_session(id).await
    }

    /// Explicit "new chat"
    pub async fn create_session(&self, title: &str) -> Result<Session> {
        self.registry.create_session(title).await
    }

    pub async fn rename_session(&self, id: &str, title: &str, tags: Option<TagSet>) -> Result<()> {
        self.registry.rename_session(id, title, tags).await
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        self.registry.delete_session(id).await
    }

    pub fn set_search(&self, query: &str) {
        self.state.borrow_mut().search = query.to_string();
    }

    // ─── Messages ────────────────────────────────────────────

    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        self.exchange.send(text).await
    }

    /// Send whatever is in the input buffer
    pub async fn send_input(&self) -> Result<SendOutcome> {
        let text = self.state.borrow().input.clone();
        self.exchange.send(&text).await
    }

    pub fn set_input(&self, text: &str) {
        self.state.borrow_mut().input = text.to_string();
    }

    /// Expand or collapse a message's source list; returns the new state
    pub fn toggle_sources(&self, index: usize) -> bool {
        self.state.borrow_mut().timeline.toggle_sources(index)
    }

    /// Copy a follow-up suggestion into the input buffer. Only the latest
    /// assistant reply's suggestions count, and only while nothing is pending.
    pub fn use_suggestion(&self, message_index: usize, suggestion_index: usize) -> bool {
        let mut st = self.state.borrow_mut();
        let pending = st.is_pending();
        if !st.timeline.suggestions_actionable(message_index, pending) {
            return false;
        }
        let suggestion = st.timeline.messages()[message_index]
            .follow_up_suggestions
            .get(suggestion_index)
            .cloned();
        match suggestion {
            Some(text) => {
                st.input = text;
                true
            }
            None => false,
        }
    }

    // ─── Retrieval filter editor ─────────────────────────────

    /// Copy the active session's committed filter into the draft
    pub fn open_filter_editor(&self) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if !st.scope.supports_filters() {
            return Err(ChatError::Unsupported {
                scope: st.scope,
                operation: "retrieval filter",
            });
        }
        let session = st.active_session().cloned().ok_or(ChatError::NoActiveSession)?;
        st.staging.open(&session);
        drop(st);
        self.events.emit(ChatEvent::FilterEditorToggled { open: true });
        Ok(())
    }

    pub fn close_filter_editor(&self) {
        self.state.borrow_mut().staging.close();
        self.events.emit(ChatEvent::FilterEditorToggled { open: false });
    }

    pub fn set_draft_folder(&self, folder: Option<&str>) {
        self.state.borrow_mut().staging.set_folder(folder);
    }

    pub fn set_draft_tags(&self, tags: TagSet) {
        self.state.borrow_mut().staging.set_tags(tags);
    }

    pub fn add_draft_tag(&self, tag: &str) -> bool {
        self.state.borrow_mut().staging.add_tag(tag)
    }

    pub fn remove_draft_tag(&self, tag: &str) -> bool {
        self.state.borrow_mut().staging.remove_tag(tag)
    }

    /// Persist the draft as the session's filter, then close the editor
    pub async fn apply_filter_draft(&self) -> Result<()> {
        let (id, draft) = {
            let st = self.state.borrow();
            let id = st.staging.session_id().ok_or(ChatError::NoActiveSession)?.to_string();
            (id, st.staging.draft().clone())
        };
        self.registry
            .apply_filter(&id, draft.folder.as_deref(), draft.tags)
            .await?;
        self.finish_editing(&id, false);
        Ok(())
    }

    /// Persist an empty filter, reset the draft and close the editor
    pub async fn clear_filter_draft(&self) -> Result<()> {
        let id = self
            .state
            .borrow()
            .staging
            .session_id()
            .ok_or(ChatError::NoActiveSession)?
            .to_string();
        self.registry.clear_filter(&id).await?;
        self.finish_editing(&id, true);
        Ok(())
    }

    fn finish_editing(&self, id: &str, reset: bool) {
        let mut st = self.state.borrow_mut();
        if st.staging.session_id() != Some(id) {
            return;
        }
        if reset {
            st.staging.reset();
        }
        st.staging.close();
        drop(st);
        self.events.emit(ChatEvent::FilterEditorToggled { open: false });
    }
}
