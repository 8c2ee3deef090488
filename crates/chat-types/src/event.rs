use serde::{Deserialize, Serialize};
use crate::message::Role;

/// Events emitted by the chat controller.
/// UI layers drain these to know when to re-render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    /// Session list replaced from the backend
    SessionsLoaded { count: usize },

    /// A session became active
    SessionActivated { session_id: String },

    /// No session is active any more
    SessionCleared,

    /// The timeline was swapped out wholesale (switch, load, create)
    TimelineReplaced { len: usize },

    /// A message was appended to the timeline
    MessageAppended { index: usize, role: Role },

    /// A question went out to the backend
    SendStarted { token: u64, session_id: String },

    /// A send finished and its reply (or fallback) is in the timeline
    SendFinished { token: u64, success: bool },

    /// A reply arrived for a session that is no longer active
    SendDiscarded { token: u64 },

    /// The filter editor opened or closed
    FilterEditorToggled { open: bool },

    /// A write operation failed; `message` is safe to show
    Error { message: String },
}
