//! JSON-over-HTTP client for the chat backend.
//!
//! Uses browser `fetch()` via gloo-net. Every endpoint path is relative to
//! the configured `base_url`.

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use chat_types::{config::BackendConfig, ChatError, Result};

#[derive(Debug, Clone)]
pub struct HttpClient {
    backend: BackendConfig,
}

impl HttpClient {
    pub fn new(backend: BackendConfig) -> Self {
        Self { backend }
    }

    pub fn url(&self, path: &str) -> String {
        self.backend.endpoint(path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let started = js_sys::Date::now();
        let response = Request::get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        log::debug!("GET {} -> {} ({:.0}ms)", url, response.status(), js_sys::Date::now() - started);
        decode(response).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let started = js_sys::Date::now();
        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        log::debug!("POST {} -> {} ({:.0}ms)", url, response.status(), js_sys::Date::now() - started);
        decode(response).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = Request::patch(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .map_err(|e| ChatError::Serialization(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        log::debug!("PATCH {} -> {}", url, response.status());
        decode(response).await
    }

    /// DELETE; any 2xx counts as success and the body is ignored
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = Request::delete(&url)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        log::debug!("DELETE {} -> {}", url, response.status());
        check(response).await.map(|_| ())
    }
}

async fn check(response: Response) -> Result<Response> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(ChatError::Backend {
        status,
        message: backend_message(&text),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    response
        .json()
        .await
        .map_err(|e| ChatError::Serialization(e.to_string()))
}

/// Pull `detail`/`error`/`message` out of a JSON error body, else use the
/// raw text
pub fn backend_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| v[*key].as_str().map(str::to_string))
    });
    match field {
        Some(message) => message,
        None if body.trim().is_empty() => "empty response".to_string(),
        None => body.trim().to_string(),
    }
}
