//! JavaScript-facing wrapper around one `ChatController`.
//!
//! Every async operation returns a `Promise`. Views are pulled with
//! `snapshot()` after each operation or whenever `drainEvents()` reports
//! something new.

use std::fmt::Display;
use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use chat_core::ports::ScopeAdapter;
use chat_core::ChatController;
use chat_platform::{BrowserTimer, GlobalChatAdapter, MeetingChatAdapter, MemoryBackend, ProjectChatAdapter};
use chat_types::{config::ChatConfig, scope::ChatScope, tags::TagSet, ChatError};

#[wasm_bindgen]
pub struct ChatHandle {
    controller: ChatController,
}

#[wasm_bindgen]
impl ChatHandle {
    /// Chat over one meeting
    pub fn meeting(meeting_id: &str, config: JsValue) -> Result<ChatHandle, JsValue> {
        let config = parse_config(config)?;
        let adapter = MeetingChatAdapter::new(config.backend.clone(), meeting_id);
        Ok(Self::wire(Rc::new(adapter), config))
    }

    /// Chat over one project
    pub fn project(project_id: &str, config: JsValue) -> Result<ChatHandle, JsValue> {
        let config = parse_config(config)?;
        let adapter = ProjectChatAdapter::new(config.backend.clone(), project_id);
        Ok(Self::wire(Rc::new(adapter), config))
    }

    /// Chat over the whole corpus
    pub fn global(config: JsValue) -> Result<ChatHandle, JsValue> {
        let config = parse_config(config)?;
        let adapter = GlobalChatAdapter::new(config.backend.clone());
        Ok(Self::wire(Rc::new(adapter), config))
    }

    /// Backend-free handle for demos; `scope` is "meeting", "project" or "global"
    #[wasm_bindgen(js_name = inMemory)]
    pub fn in_memory(scope: &str) -> Result<ChatHandle, JsValue> {
        let scope = parse_scope(scope)?;
        Ok(Self::wire(Rc::new(MemoryBackend::new(scope)), ChatConfig::default()))
    }

    fn wire(adapter: Rc<dyn ScopeAdapter>, config: ChatConfig) -> ChatHandle {
        log::info!("Chat handle ready: {} ({})", adapter.adapter_name(), adapter.scope().label());
        ChatHandle {
            controller: ChatController::new(adapter, Rc::new(BrowserTimer::new()), config),
        }
    }

    // ─── Sessions ────────────────────────────────────────────

    pub fn load(&self) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            ctl.load().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the refreshed session list
    #[wasm_bindgen(js_name = listSessions)]
    pub fn list_sessions(&self) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move { to_js(&ctl.list_sessions().await) })
    }

    #[wasm_bindgen(js_name = selectSession)]
    pub fn select_session(&self, id: String) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            ctl.select_session(&id).await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the created session
    #[wasm_bindgen(js_name = createSession)]
    pub fn create_session(&self, title: String) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            let session = ctl.create_session(&title).await.map_err(js_error)?;
            to_js(&session)
        })
    }

    /// `tags` is comma-separated; ignored in project scope
    #[wasm_bindgen(js_name = renameSession)]
    pub fn rename_session(&self, id: String, title: String, tags: Option<String>) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            let tags = tags.as_deref().map(TagSet::parse_csv);
            ctl.rename_session(&id, &title, tags).await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = deleteSession)]
    pub fn delete_session(&self, id: String) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            ctl.delete_session(&id).await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = setSearch)]
    pub fn set_search(&self, query: &str) {
        self.controller.set_search(query);
    }

    // ─── Messages ────────────────────────────────────────────

    /// Resolves to `{ status: "answered" | "failed" | "discarded", ... }`
    pub fn send(&self, text: String) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            let outcome = ctl.send(&text).await.map_err(js_error)?;
            to_js(&outcome)
        })
    }

    #[wasm_bindgen(js_name = sendInput)]
    pub fn send_input(&self) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            let outcome = ctl.send_input().await.map_err(js_error)?;
            to_js(&outcome)
        })
    }

    #[wasm_bindgen(js_name = setInput)]
    pub fn set_input(&self, text: &str) {
        self.controller.set_input(text);
    }

    #[wasm_bindgen(js_name = toggleSources)]
    pub fn toggle_sources(&self, index: usize) -> bool {
        self.controller.toggle_sources(index)
    }

    #[wasm_bindgen(js_name = useSuggestion)]
    pub fn use_suggestion(&self, message_index: usize, suggestion_index: usize) -> bool {
        self.controller.use_suggestion(message_index, suggestion_index)
    }

    // ─── Retrieval filter ────────────────────────────────────

    #[wasm_bindgen(js_name = openFilterEditor)]
    pub fn open_filter_editor(&self) -> Result<(), JsValue> {
        self.controller.open_filter_editor().map_err(js_error)
    }

    #[wasm_bindgen(js_name = closeFilterEditor)]
    pub fn close_filter_editor(&self) {
        self.controller.close_filter_editor();
    }

    #[wasm_bindgen(js_name = setDraftFolder)]
    pub fn set_draft_folder(&self, folder: Option<String>) {
        self.controller.set_draft_folder(folder.as_deref());
    }

    /// `tags` is comma-separated
    #[wasm_bindgen(js_name = setDraftTags)]
    pub fn set_draft_tags(&self, tags: &str) {
        self.controller.set_draft_tags(TagSet::parse_csv(tags));
    }

    #[wasm_bindgen(js_name = addDraftTag)]
    pub fn add_draft_tag(&self, tag: &str) -> bool {
        self.controller.add_draft_tag(tag)
    }

    #[wasm_bindgen(js_name = removeDraftTag)]
    pub fn remove_draft_tag(&self, tag: &str) -> bool {
        self.controller.remove_draft_tag(tag)
    }

    #[wasm_bindgen(js_name = applyFilter)]
    pub fn apply_filter(&self) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            ctl.apply_filter_draft().await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = clearFilter)]
    pub fn clear_filter(&self) -> Promise {
        let ctl = self.controller.clone();
        future_to_promise(async move {
            ctl.clear_filter_draft().await.map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    // ─── Views ───────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.snapshot())
    }

    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.events().drain())
    }
}

/// Accepts `undefined`/`null`, a config object or a JSON string
fn parse_config(config: JsValue) -> Result<ChatConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ChatConfig::default());
    }
    if let Some(raw) = config.as_string() {
        return serde_json::from_str(&raw).map_err(js_error);
    }
    config.into_serde().map_err(js_error)
}

fn parse_scope(raw: &str) -> Result<ChatScope, JsValue> {
    ChatScope::all()
        .iter()
        .copied()
        .find(|s| s.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| js_error(ChatError::Other(format!("Unknown chat scope: {}", raw))))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(js_error)
}

fn js_error(e: impl Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}
