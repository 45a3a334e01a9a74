//! HTTP transport for the completion endpoint

use crate::error::ExchangeError;
use crate::runtime::{ChunkStream, CompletionTransport, TransportResponse};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// POSTs `{"prompt": ...}` and exposes the response body as raw chunks
///
/// No request timeout is set: answers stream for as long as the backend
/// keeps the connection open.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent(concat!("infrabot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExchangeError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

fn classify(e: &reqwest::Error) -> ExchangeError {
    if e.is_timeout() {
        ExchangeError::transport(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        ExchangeError::transport(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ExchangeError::decoding(format!("Failed to read response: {e}"))
    } else {
        ExchangeError::transport(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, prompt: &str) -> Result<TransportResponse, ExchangeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        let body: ChunkStream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(|e| classify(&e)))
            .boxed();

        Ok(TransportResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport {
    inner: Arc<dyn CompletionTransport>,
    endpoint: String,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn CompletionTransport>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl CompletionTransport for LoggingTransport {
    async fn send(&self, prompt: &str) -> Result<TransportResponse, ExchangeError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    status = response.status,
                    prompt_chars = prompt.chars().count(),
                    "Chat request opened"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
