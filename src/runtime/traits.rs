//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the controller with mock implementations.

use crate::error::ExchangeError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// Response body as a sequence of raw byte chunks, in arrival order
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>, ExchangeError>>;

/// Status line and body of a completion response
pub struct TransportResponse {
    pub status: u16,
    pub body: ChunkStream,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Client for the completion endpoint
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send a prompt; resolves once the response status is known
    async fn send(&self, prompt: &str) -> Result<TransportResponse, ExchangeError>;

    /// Endpoint description for logging
    fn endpoint(&self) -> &str;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: CompletionTransport + ?Sized> CompletionTransport for Arc<T> {
    async fn send(&self, prompt: &str) -> Result<TransportResponse, ExchangeError> {
        (**self).send(prompt).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
