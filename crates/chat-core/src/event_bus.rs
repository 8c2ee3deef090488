//! Change notifications from the controller to whatever renders it.
//!
//! Single-threaded (WASM) and shared through `Rc<RefCell<..>>`. The buffer
//! is bounded: a page that never drains only loses the oldest events, and
//! `dropped()` says how many.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use chat_types::event::ChatEvent;

const DEFAULT_CAPACITY: usize = 256;

struct Buffer {
    events: VecDeque<ChatEvent>,
    capacity: usize,
    dropped: u64,
}

/// Shared event bus — clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<Buffer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Buffer {
                events: VecDeque::new(),
                capacity: capacity.max(1),
                dropped: 0,
            })),
        }
    }

    pub fn emit(&self, event: ChatEvent) {
        let mut buf = self.inner.borrow_mut();
        if buf.events.len() == buf.capacity {
            buf.events.pop_front();
            buf.dropped += 1;
        }
        buf.events.push_back(event);
    }

    /// Take everything buffered, oldest first
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().events.is_empty()
    }

    /// Events discarded because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
