//! Chat App — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It picks a scope adapter, hands it to a `ChatController` and exposes the
//! controller to the page as [`ChatHandle`].

mod handle;

pub use handle::ChatHandle;

use wasm_bindgen::prelude::*;

/// WASM entry point — runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Chat module loaded");
}
