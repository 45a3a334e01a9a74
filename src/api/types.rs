//! API request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`, both inbound and as forwarded to the backend
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    /// Kept as raw JSON so it is forwarded exactly as received
    #[serde(default)]
    pub prompt: Value,
}

impl ChatRequest {
    /// A prompt counts as missing when it is absent, null, or otherwise falsy
    pub fn has_prompt(&self) -> bool {
        match &self.prompt {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
