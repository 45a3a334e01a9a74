//! Mock implementations for testing
//!
//! These mocks enable controller and session testing without real I/O.

use super::traits::*;
use crate::error::ExchangeError;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

// ============================================================================
// Scripted responses
// ============================================================================

/// One canned reply for `MockTransport`
pub enum ScriptedResponse {
    Respond(TransportResponse),
    Fail(ExchangeError),
}

#[allow(dead_code)]
impl ScriptedResponse {
    /// 200 response streaming the given text chunks
    pub fn stream(chunks: &[&str]) -> Self {
        Self::bytes(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
    }

    /// 200 response streaming raw byte chunks
    pub fn bytes(chunks: Vec<Vec<u8>>) -> Self {
        Self::Respond(TransportResponse {
            status: 200,
            body: stream::iter(chunks.into_iter().map(Ok)).boxed(),
        })
    }

    /// Non-success response with a complete body
    pub fn error(status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Self::Respond(TransportResponse {
            status,
            body: stream::iter(vec![Ok(body)]).boxed(),
        })
    }

    /// The request never produced a response
    pub fn connect_error(message: &str) -> Self {
        Self::Fail(ExchangeError::transport(message))
    }

    /// 200 response that fails after delivering the given chunks
    pub fn broken_stream(chunks: &[&str], message: &str) -> Self {
        let mut items: Vec<Result<Vec<u8>, ExchangeError>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        items.push(Err(ExchangeError::transport(message)));
        Self::Respond(TransportResponse {
            status: 200,
            body: stream::iter(items).boxed(),
        })
    }

    /// 200 response that delivers its first chunk, then holds the rest until
    /// the returned sender fires
    pub fn gated(chunks: &[&str]) -> (oneshot::Sender<()>, Self) {
        let (release, gate) = oneshot::channel::<()>();
        let mut items: Vec<Result<Vec<u8>, ExchangeError>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        let rest = items.split_off(items.len().min(1));

        let held = stream::once(async move {
            let _ = gate.await;
            stream::iter(rest)
        })
        .flatten();

        let response = Self::Respond(TransportResponse {
            status: 200,
            body: stream::iter(items).chain(held).boxed(),
        });
        (release, response)
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that replays queued responses in order
#[allow(dead_code)]
pub struct MockTransport {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    /// Record of all prompts sent
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn queue(&self, response: ScriptedResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Get recorded prompts
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    async fn send(&self, prompt: &str) -> Result<TransportResponse, ExchangeError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(ScriptedResponse::Respond(response)) => Ok(response),
            Some(ScriptedResponse::Fail(error)) => Err(error),
            None => Err(ExchangeError::transport("No mock response queued")),
        }
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }
}
