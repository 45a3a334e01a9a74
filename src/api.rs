//! HTTP relay for the chat endpoint
//!
//! Forwards `POST /api/chat` to the completion backend and streams the answer
//! back unchanged.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use reqwest::Client;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    /// Backend base URL, without the `/api/chat` suffix
    pub backend_url: Arc<str>,
}

impl AppState {
    pub fn new(backend_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("infrabot-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').into(),
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.backend_url)
    }
}
