pub mod http;
pub mod dto;
pub mod scopes;
pub mod memory;
pub mod timer;

#[cfg(test)]
mod tests;

pub use memory::MemoryBackend;
pub use scopes::{GlobalChatAdapter, MeetingChatAdapter, ProjectChatAdapter};
pub use timer::BrowserTimer;
