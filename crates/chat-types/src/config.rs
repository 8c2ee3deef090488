use serde::{Deserialize, Serialize};

/// Top-level controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// How many trailing timeline messages (user and assistant alike) travel
    /// with each question as context
    pub history_window: usize,
    /// How many sources the backend should cite
    pub top_k: usize,
    /// `None` waits for the backend indefinitely
    pub send_timeout_ms: Option<u64>,
    pub backend: BackendConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            top_k: DEFAULT_TOP_K,
            send_timeout_ms: Some(DEFAULT_SEND_TIMEOUT_MS),
            backend: BackendConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Prefix for every endpoint, without a trailing slash
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

const DEFAULT_HISTORY_WINDOW: usize = 6;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_SEND_TIMEOUT_MS: u64 = 120_000;
