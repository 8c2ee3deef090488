//! The active session's message timeline plus its per-message view state.
//!
//! Source lists are expanded/collapsed per message, keyed by timeline index.
//! Replacing the timeline (switch, load, create) resets that map.

use std::collections::HashMap;
use chat_types::message::Message;

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    messages: Vec<Message>,
    expanded: HashMap<usize, bool>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append and return the new message's index
    pub(crate) fn push(&mut self, msg: Message) -> usize {
        self.messages.push(msg);
        self.messages.len() - 1
    }

    /// Swap in another session's timeline
    pub(crate) fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.expanded.clear();
    }

    /// Overwrite the same session's timeline after a send reconciles.
    /// Indices are stable so expansion state survives.
    pub(crate) fn settle(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        let len = self.messages.len();
        self.expanded.retain(|index, _| *index < len);
    }

    /// Flip a message's source list; returns the new state.
    /// Messages without sources never expand.
    pub fn toggle_sources(&mut self, index: usize) -> bool {
        match self.messages.get(index) {
            Some(msg) if !msg.sources.is_empty() => {
                let open = self.expanded.entry(index).or_insert(false);
                *open = !*open;
                *open
            }
            _ => false,
        }
    }

    pub fn sources_expanded(&self, index: usize) -> bool {
        self.expanded.get(&index).copied().unwrap_or(false)
    }

    /// Suggestions are clickable only on the last message, only when it is
    /// an assistant reply, and only while nothing is being sent.
    pub fn suggestions_actionable(&self, index: usize, pending: bool) -> bool {
        !pending
            && index + 1 == self.messages.len()
            && self.messages[index].is_assistant()
            && !self.messages[index].follow_up_suggestions.is_empty()
    }

    pub fn actionable_suggestions(&self, pending: bool) -> Option<&[String]> {
        let index = self.messages.len().checked_sub(1)?;
        if self.suggestions_actionable(index, pending) {
            Some(&self.messages[index].follow_up_suggestions)
        } else {
            None
        }
    }
}
