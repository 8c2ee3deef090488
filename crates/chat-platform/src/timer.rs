//! Browser timer backed by `setTimeout`.

use futures::future::{FutureExt, LocalBoxFuture};
use gloo_timers::future::TimeoutFuture;

use chat_core::ports::TimerPort;

const MAX_DELAY_MS: u64 = i32::MAX as u64;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl BrowserTimer {
    pub fn new() -> Self {
        Self
    }
}

impl TimerPort for BrowserTimer {
    fn sleep(&self, ms: u64) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(clamp_delay(ms)).boxed_local()
    }
}

/// setTimeout treats delays above `i32::MAX` as 0
pub(crate) fn clamp_delay(ms: u64) -> u32 {
    ms.min(MAX_DELAY_MS) as u32
}
