//! Session registry — which sessions exist in this scope and which is active.
//!
//! Reads degrade quietly: a failed list or message fetch leaves an empty
//! state behind. Writes apply locally only after the backend confirms them
//! and report failures as a short human-readable `last_error`.

use std::rc::Rc;
use chat_types::{
    ChatError, Result,
    event::ChatEvent,
    filter::RetrievalFilter,
    session::{Session, SessionPatch},
    tags::TagSet,
};
use crate::event_bus::EventBus;
use crate::ports::ScopeAdapter;
use crate::state::SharedState;

#[derive(Clone)]
pub struct SessionRegistry {
    adapter: Rc<dyn ScopeAdapter>,
    state: SharedState,
    events: EventBus,
}

impl SessionRegistry {
    pub(crate) fn new(adapter: Rc<dyn ScopeAdapter>, state: SharedState, events: EventBus) -> Self {
        Self {
            adapter,
            state,
            events,
        }
    }

    /// Initial load: fetch the list, activate the first session (if any)
    /// and its timeline, then the tag/folder vocabularies.
    pub async fn load(&self) {
        let sessions = self.list_sessions().await;
        let first = sessions.first().map(|s| s.id.clone());
        let generation = self.state.borrow_mut().activate(first.clone());
        self.announce_activation(first.as_deref());

        if let Some(id) = first {
            self.fetch_timeline(&id, generation).await;
        }
        self.load_vocabulary().await;
    }

    /// Fetch the session list. A failure empties the list and clears the
    /// active session rather than surfacing an error.
    pub async fn list_sessions(&self) -> Vec<Session> {
        match self.adapter.list_sessions().await {
            Ok(sessions) => {
                self.store_sessions(sessions.clone());
                sessions
            }
            Err(e) => {
                log::warn!("[{}] Listing sessions failed: {}", self.adapter.adapter_name(), e);
                let had_active = {
                    let mut st = self.state.borrow_mut();
                    st.sessions.clear();
                    let had_active = st.active_id.is_some();
                    if had_active {
                        st.activate(None);
                    }
                    had_active
                };
                self.events.emit(ChatEvent::SessionsLoaded { count: 0 });
                if had_active {
                    self.announce_activation(None);
                }
                Vec::new()
            }
        }
    }

    /// Refresh backend-owned fields (titles, counts, filters) without
    /// touching the active session. A failure keeps the current list.
    pub async fn sync_metadata(&self) {
        match self.adapter.list_sessions().await {
            Ok(sessions) => self.store_sessions(sessions),
            Err(e) => {
                log::warn!("[{}] Session refresh failed, keeping current list: {}", self.adapter.adapter_name(), e);
            }
        }
    }

    /// Make `id` active and load its timeline. Selecting the active session
    /// does nothing.
    pub async fn select_session(&self, id: &str) -> Result<()> {
        let generation = {
            let mut st = self.state.borrow_mut();
            if st.active_id.as_deref() == Some(id) {
                return Ok(());
            }
            if st.session(id).is_none() {
                return Err(ChatError::SessionNotFound(id.to_string()));
            }
            st.activate(Some(id.to_string()))
        };
        self.announce_activation(Some(id));
        self.fetch_timeline(id, generation).await;
        Ok(())
    }

    /// Create a session, put it first in the list and make it active
    pub async fn create_session(&self, title: &str) -> Result<Session> {
        let expected = self.state.borrow().generation;
        match self.create_and_adopt(title, expected).await {
            Ok((session, _)) => Ok(session),
            Err(e) => {
                self.fail("Could not create a new chat", &e);
                Err(e)
            }
        }
    }

    /// Create a session and adopt it as active unless the timeline moved on
    /// (another session was selected) while the call was in flight.
    /// Returns the session and whether it was activated.
    pub(crate) async fn create_and_adopt(&self, title: &str, expected_generation: u64) -> Result<(Session, bool)> {
        let session = self.adapter.create_session(title).await?;
        let activated = {
            let mut st = self.state.borrow_mut();
            st.sessions.insert(0, session.clone());
            st.last_error = None;
            let activated = st.generation == expected_generation;
            if activated {
                st.activate(Some(session.id.clone()));
            }
            activated
        };
        log::info!("Created session {} ({})", session.id, session.title);
        let count = self.state.borrow().sessions.len();
        self.events.emit(ChatEvent::SessionsLoaded { count });
        if activated {
            self.announce_activation(Some(&session.id));
        }
        Ok((session, activated))
    }

    /// Rename (and retag, where the scope has tags), then refresh the list
    pub async fn rename_session(&self, id: &str, title: &str, tags: Option<TagSet>) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }
        let tags = if self.adapter.scope().supports_tags() {
            tags
        } else {
            if tags.as_ref().is_some_and(|t| !t.is_empty()) {
                log::debug!("Ignoring tags for {} scope", self.adapter.scope().label());
            }
            None
        };

        match self.adapter.update_session(id, SessionPatch::rename(title, tags)).await {
            Ok(_) => {
                self.state.borrow_mut().last_error = None;
                self.sync_metadata().await;
                Ok(())
            }
            Err(e) => {
                self.fail("Could not rename the chat", &e);
                Err(e)
            }
        }
    }

    /// Delete a session. Deleting the active one moves to the session that
    /// followed it (or preceded it, if it was last) or to no session at all.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        if let Err(e) = self.adapter.delete_session(id).await {
            self.fail("Could not delete the chat", &e);
            return Err(e);
        }

        let reactivated = {
            let mut st = self.state.borrow_mut();
            let position = st.sessions.iter().position(|s| s.id == id);
            if let Some(pos) = position {
                st.sessions.remove(pos);
            }
            st.last_error = None;
            if st.active_id.as_deref() == Some(id) {
                let pos = position.unwrap_or(0);
                let next = st
                    .sessions
                    .get(pos)
                    .or_else(|| st.sessions.last())
                    .map(|s| s.id.clone());
                let generation = st.activate(next.clone());
                Some((next, generation))
            } else {
                None
            }
        };

        log::info!("Deleted session {}", id);
        let count = self.state.borrow().sessions.len();
        self.events.emit(ChatEvent::SessionsLoaded { count });

        if let Some((next, generation)) = reactivated {
            self.announce_activation(next.as_deref());
            if let Some(next) = next {
                self.fetch_timeline(&next, generation).await;
            }
        }
        Ok(())
    }

    /// Persist a retrieval filter on a session (global scope)
    pub async fn apply_filter(&self, id: &str, folder: Option<&str>, tags: TagSet) -> Result<()> {
        let filter = RetrievalFilter::new(folder, tags);
        self.persist_filter(id, filter, "Could not apply the filter").await
    }

    /// Remove a session's retrieval filter (global scope)
    pub async fn clear_filter(&self, id: &str) -> Result<()> {
        self.persist_filter(id, RetrievalFilter::default(), "Could not clear the filter").await
    }

    async fn persist_filter(&self, id: &str, filter: RetrievalFilter, context: &str) -> Result<()> {
        let scope = self.adapter.scope();
        if !scope.supports_filters() {
            return Err(ChatError::Unsupported {
                scope,
                operation: "retrieval filter",
            });
        }

        match self.adapter.update_session(id, SessionPatch::filter(filter)).await {
            Ok(_) => {
                self.state.borrow_mut().last_error = None;
                self.sync_metadata().await;
                Ok(())
            }
            Err(e) => {
                self.fail(context, &e);
                Err(e)
            }
        }
    }

    /// Fetch the tag and folder vocabularies the scope offers
    pub async fn load_vocabulary(&self) {
        let scope = self.adapter.scope();
        let name = self.adapter.adapter_name();
        let degrade = |what: &str, result: Result<Vec<String>>| {
            result.unwrap_or_else(|e| {
                log::warn!("[{}] Loading {} failed: {}", name, what, e);
                Vec::new()
            })
        };

        let (known, folders, filter_tags) = futures::join!(
            async {
                if scope.supports_tags() {
                    degrade("known tags", self.adapter.known_tags().await)
                } else {
                    Vec::new()
                }
            },
            async {
                if scope.supports_filters() {
                    degrade("filter folders", self.adapter.filter_folders().await)
                } else {
                    Vec::new()
                }
            },
            async {
                if scope.supports_filters() {
                    degrade("filter tags", self.adapter.filter_tags().await)
                } else {
                    Vec::new()
                }
            },
        );

        let mut st = self.state.borrow_mut();
        st.known_tags = known.into_iter().collect();
        st.filter_folders = folders;
        st.filter_tag_options = filter_tags.into_iter().collect();
    }

    /// Load `id`'s messages into the timeline if it is still the one shown
    async fn fetch_timeline(&self, id: &str, generation: u64) {
        let messages = match self.adapter.get_messages(id).await {
            Ok(messages) => messages,
            Err(e) => {
                log::warn!("[{}] Loading messages for {} failed: {}", self.adapter.adapter_name(), id, e);
                Vec::new()
            }
        };

        let mut st = self.state.borrow_mut();
        if st.generation != generation || st.active_id.as_deref() != Some(id) {
            log::debug!("Dropping stale timeline for {}", id);
            return;
        }
        let len = messages.len();
        st.timeline.replace(messages);
        drop(st);
        self.events.emit(ChatEvent::TimelineReplaced { len });
    }

    fn store_sessions(&self, sessions: Vec<Session>) {
        let count = sessions.len();
        self.state.borrow_mut().sessions = sessions;
        self.events.emit(ChatEvent::SessionsLoaded { count });
    }

    fn announce_activation(&self, id: Option<&str>) {
        match id {
            Some(id) => self.events.emit(ChatEvent::SessionActivated {
                session_id: id.to_string(),
            }),
            None => self.events.emit(ChatEvent::SessionCleared),
        }
        self.events.emit(ChatEvent::TimelineReplaced { len: 0 });
    }

    fn fail(&self, context: &str, err: &ChatError) {
        log::warn!("[{}] {}: {}", self.adapter.adapter_name(), context, err);
        self.state.borrow_mut().last_error = Some(context.to_string());
        self.events.emit(ChatEvent::Error {
            message: context.to_string(),
        });
    }
}
