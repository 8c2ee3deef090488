//! Mutable state owned by one controller instance.
//!
//! Shared between the registry and the exchange controller through
//! `Rc<RefCell<..>>`. A borrow is never held across an `.await`, so other
//! user actions can run while a backend round trip is suspended.

use std::cell::RefCell;
use std::rc::Rc;
use futures::future::AbortHandle;
use chat_types::{
    scope::ChatScope,
    session::Session,
    tags::TagSet,
};
use crate::staging::FilterStaging;
use crate::timeline::Timeline;

pub(crate) type SharedState = Rc<RefCell<ControllerState>>;

/// A send whose reply has not been reconciled yet
#[derive(Debug)]
pub struct PendingSend {
    pub token: u64,
    /// `None` until an implicitly created session exists
    pub session_id: Option<String>,
    pub(crate) abort: Option<AbortHandle>,
}

impl PendingSend {
    pub(crate) fn new(token: u64, session_id: Option<String>) -> Self {
        Self {
            token,
            session_id,
            abort: None,
        }
    }
}

#[derive(Debug)]
pub struct ControllerState {
    pub scope: ChatScope,
    /// Backend order; new sessions go to the front
    pub sessions: Vec<Session>,
    pub active_id: Option<String>,
    pub timeline: Timeline,
    pub input: String,
    pub search: String,
    /// Tags known to the backend across the corpus
    pub known_tags: TagSet,
    pub filter_folders: Vec<String>,
    pub filter_tag_options: TagSet,
    pub staging: FilterStaging,
    pub pending: Option<PendingSend>,
    /// Human-readable message from the last failed write
    pub last_error: Option<String>,
    /// Bumped whenever the active timeline is swapped out
    pub(crate) generation: u64,
    pub(crate) next_token: u64,
    /// Generation swap caused by a send creating its own session: (before, after)
    pub(crate) adopted: Option<(u64, u64)>,
}

impl ControllerState {
    pub fn new(scope: ChatScope) -> Self {
        Self {
            scope,
            sessions: Vec::new(),
            active_id: None,
            timeline: Timeline::new(),
            input: String::new(),
            search: String::new(),
            known_tags: TagSet::new(),
            filter_folders: Vec::new(),
            filter_tag_options: TagSet::new(),
            staging: FilterStaging::new(),
            pending: None,
            last_error: None,
            generation: 0,
            next_token: 0,
            adopted: None,
        }
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active_id.as_deref().and_then(|id| self.session(id))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Sessions matching the current search query, in list order
    pub fn filtered_sessions(&self) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.matches_query(&self.search))
            .collect()
    }

    /// Backend-known tags plus every tag on a loaded session
    pub fn tag_vocabulary(&self) -> TagSet {
        let mut vocab = self.known_tags.clone();
        for session in &self.sessions {
            vocab.extend_from(&session.tags);
        }
        vocab
    }

    /// Suggestions for the filter dialog's tag input
    pub fn filter_tag_vocabulary(&self) -> TagSet {
        let mut vocab = self.tag_vocabulary();
        vocab.extend_from(&self.filter_tag_options);
        for session in &self.sessions {
            vocab.extend_from(&session.filter_tags);
        }
        vocab
    }

    /// Whether a send issued while `issued_id` was active at `generation`
    /// still owns the timeline. An empty timeline replaced by a session that
    /// an earlier send created for it counts as the same timeline.
    pub(crate) fn owns_timeline(&self, issued_id: Option<&str>, generation: u64) -> bool {
        self.generation == generation
            || (issued_id.is_none() && self.adopted == Some((generation, self.generation)))
    }

    /// Drop any in-flight send and start a new timeline generation.
    /// Returns the new generation.
    pub(crate) fn invalidate(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            if let Some(handle) = pending.abort {
                handle.abort();
            }
            log::debug!("Abandoned in-flight send #{}", pending.token);
        }
        self.generation += 1;
        self.generation
    }

    /// Point at `id` (or nothing) with an empty timeline.
    /// Returns the new generation.
    pub(crate) fn activate(&mut self, id: Option<String>) -> u64 {
        self.active_id = id;
        self.timeline.replace(Vec::new());
        self.staging.close();
        self.invalidate()
    }
}
