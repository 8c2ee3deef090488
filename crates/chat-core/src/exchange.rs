//! Message exchange — the send pipeline.
//!
//! One send:
//! 1. Append the user message optimistically (snapshotting the timeline first)
//! 2. Create a session if none is active, titled with the placeholder
//! 3. Dispatch the question with a trailing history window, the committed
//!    filter and top-K
//! 4. Rebuild the timeline from the snapshot + user message + reply (or the
//!    fallback reply on failure/timeout)
//! 5. Refresh the session list once if the session still needs a real title
//!
//! Sends are serialized: a second send waits for the first to finish, and is
//! dropped if the session it was issued on is no longer active by then.
//! A reply is applied only if its token still owns the active timeline;
//! switching sessions abandons the in-flight request.

use std::rc::Rc;
use futures::future::{self, AbortHandle, AbortRegistration, Abortable, Either};
use futures::lock::Mutex;
use serde::Serialize;
use chat_types::{
    ChatError, Result,
    config::ChatConfig,
    event::ChatEvent,
    exchange::{history_window, SendRequest, SendResponse},
    message::{Message, Role},
    session::PLACEHOLDER_TITLE,
};
use crate::event_bus::EventBus;
use crate::ports::{ScopeAdapter, TimerPort};
use crate::registry::SessionRegistry;
use crate::state::{PendingSend, SharedState};

/// How a send ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendOutcome {
    /// The reply is in the timeline
    Answered { session_id: String, refreshed: bool },
    /// The fallback reply is in the timeline
    Failed,
    /// The user moved to another session before the reply arrived
    Discarded,
}

#[derive(Clone)]
pub struct MessageExchangeController {
    adapter: Rc<dyn ScopeAdapter>,
    registry: SessionRegistry,
    state: SharedState,
    events: EventBus,
    timer: Rc<dyn TimerPort>,
    config: Rc<ChatConfig>,
    turn: Rc<Mutex<()>>,
}

impl MessageExchangeController {
    pub(crate) fn new(
        adapter: Rc<dyn ScopeAdapter>,
        registry: SessionRegistry,
        state: SharedState,
        events: EventBus,
        timer: Rc<dyn TimerPort>,
        config: ChatConfig,
    ) -> Self {
        Self {
            adapter,
            registry,
            state,
            events,
            timer,
            config: Rc::new(config),
            turn: Rc::new(Mutex::new(())),
        }
    }

    /// Send `text` on the active session, creating one if needed.
    ///
    /// Only blank input is an error; backend failures end as
    /// [`SendOutcome::Failed`] with the fallback reply in the timeline.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (issued_id, issued_generation) = {
            let st = self.state.borrow();
            (st.active_id.clone(), st.generation)
        };
        let _turn = self.turn.lock().await;

        let stale = {
            let mut st = self.state.borrow_mut();
            if st.owns_timeline(issued_id.as_deref(), issued_generation) {
                None
            } else {
                st.next_token += 1;
                Some(st.next_token)
            }
        };
        if let Some(token) = stale {
            log::info!(
                "Send #{} was issued on {} which is no longer active; dropping it",
                token,
                issued_id.as_deref().unwrap_or("a new chat")
            );
            self.events.emit(ChatEvent::SendDiscarded { token });
            return Ok(SendOutcome::Discarded);
        }

        // Optimistic user message
        let (token, start_generation, active, mut base) = {
            let mut st = self.state.borrow_mut();
            st.next_token += 1;
            let token = st.next_token;
            let base = st.timeline.messages().to_vec();
            st.timeline.push(Message::user(text));
            st.input.clear();
            st.pending = Some(PendingSend::new(token, st.active_id.clone()));
            (token, st.generation, st.active_id.clone(), base)
        };
        self.events.emit(ChatEvent::MessageAppended {
            index: base.len(),
            role: Role::User,
        });

        // Deferred session creation
        let mut created = false;
        let session_id = match active {
            Some(id) => id,
            None => match self.registry.create_and_adopt(PLACEHOLDER_TITLE, start_generation).await {
                Ok((session, true)) => {
                    base.clear();
                    let mut st = self.state.borrow_mut();
                    let index = st.timeline.push(Message::user(text));
                    st.adopted = Some((start_generation, st.generation));
                    st.pending = Some(PendingSend::new(token, Some(session.id.clone())));
                    drop(st);
                    self.events.emit(ChatEvent::MessageAppended {
                        index,
                        role: Role::User,
                    });
                    created = true;
                    session.id
                }
                Ok((session, false)) => {
                    log::info!("Session {} created but another session is now active; dropping send #{}", session.id, token);
                    self.events.emit(ChatEvent::SendDiscarded { token });
                    return Ok(SendOutcome::Discarded);
                }
                Err(e) => {
                    log::warn!("[{}] Creating a session for send #{} failed: {}", self.adapter.adapter_name(), token, e);
                    return Ok(self.reconcile(token, start_generation, base, text, Err(e)));
                }
            },
        };

        // Dispatch
        let (request, registration, generation) = {
            let mut st = self.state.borrow_mut();
            let filter = if st.scope.supports_filters() {
                st.session(&session_id)
                    .map(|s| s.committed_filter())
                    .filter(|f| !f.is_empty())
            } else {
                None
            };
            let request = SendRequest {
                text: text.to_string(),
                history: history_window(&base, self.config.history_window),
                top_k: self.config.top_k,
                filter,
            };
            let (handle, registration) = AbortHandle::new_pair();
            if let Some(pending) = st.pending.as_mut() {
                pending.abort = Some(handle);
            }
            (request, registration, st.generation)
        };
        self.events.emit(ChatEvent::SendStarted {
            token,
            session_id: session_id.clone(),
        });
        log::debug!("Send #{} dispatched on {}", token, session_id);

        let result = self.dispatch(&session_id, request, registration).await;

        // Reconcile
        let answered = match &result {
            Ok(response) => response
                .session_id
                .clone()
                .filter(|id| !id.is_empty())
                .or_else(|| Some(session_id.clone())),
            Err(_) => None,
        };
        let outcome = self.reconcile(token, generation, base, text, result);

        match (outcome, answered) {
            (SendOutcome::Answered { .. }, Some(answered_id)) => {
                let refresh = {
                    let mut st = self.state.borrow_mut();
                    if answered_id != session_id {
                        log::info!("Backend moved send #{} from {} to {}", token, session_id, answered_id);
                        if let Some(session) = st.sessions.iter_mut().find(|s| s.id == session_id) {
                            session.id = answered_id.clone();
                        }
                        st.active_id = Some(answered_id.clone());
                    }
                    created
                        || st
                            .session(&answered_id)
                            .map(|s| s.is_unrefreshed())
                            .unwrap_or(false)
                };
                if refresh {
                    self.registry.sync_metadata().await;
                }
                Ok(SendOutcome::Answered {
                    session_id: answered_id,
                    refreshed: refresh,
                })
            }
            (outcome, _) => Ok(outcome),
        }
    }

    /// Ask the backend, bounded by the configured timeout and abortable
    /// through the pending send's handle
    async fn dispatch(
        &self,
        session_id: &str,
        request: SendRequest,
        registration: AbortRegistration,
    ) -> Result<SendResponse> {
        let call = Abortable::new(
            self.adapter.send_message(Some(session_id), request),
            registration,
        );
        let finished = match self.config.send_timeout_ms {
            Some(ms) => match future::select(call, self.timer.sleep(ms)).await {
                Either::Left((finished, _)) => finished,
                Either::Right(_) => return Err(ChatError::Timeout(ms)),
            },
            None => call.await,
        };
        finished.unwrap_or(Err(ChatError::Cancelled))
    }

    /// Rebuild the timeline as `base` + user message + reply, unless the
    /// send no longer owns the active timeline.
    fn reconcile(
        &self,
        token: u64,
        generation: u64,
        base: Vec<Message>,
        text: &str,
        result: Result<SendResponse>,
    ) -> SendOutcome {
        let mut st = self.state.borrow_mut();
        let current = st.generation == generation
            && st.pending.as_ref().map(|p| p.token) == Some(token);
        if !current {
            drop(st);
            log::debug!("Discarding reply for send #{}", token);
            self.events.emit(ChatEvent::SendDiscarded { token });
            return SendOutcome::Discarded;
        }
        st.pending = None;

        let (reply, outcome) = match result {
            Ok(response) => {
                let session_id = response.session_id.clone().unwrap_or_default();
                (
                    response.into_message(),
                    SendOutcome::Answered {
                        session_id,
                        refreshed: false,
                    },
                )
            }
            Err(e) => {
                log::warn!("[{}] Send #{} failed: {}", self.adapter.adapter_name(), token, e);
                (Message::fallback(), SendOutcome::Failed)
            }
        };

        let mut messages = base;
        messages.push(Message::user(text));
        messages.push(reply);
        let index = messages.len() - 1;
        st.timeline.settle(messages);
        drop(st);

        let success = matches!(outcome, SendOutcome::Answered { .. });
        self.events.emit(ChatEvent::MessageAppended {
            index,
            role: Role::Assistant,
        });
        self.events.emit(ChatEvent::SendFinished { token, success });
        outcome
    }
}
