//! Exchange error types
//!
//! Every failure of a chat exchange is classified into one of these kinds
//! and rendered to the user as a single assistant message.

use serde::Deserialize;
use thiserror::Error;

pub const GENERIC_ERROR: &str = "An error occurred.";
pub const TRANSPORT_ERROR: &str =
    "An error occurred while processing your request. Please try again.";
pub const INVALID_REQUEST_ERROR: &str = "Invalid request. Please check your input and try again.";
pub const RATE_LIMIT_ERROR: &str = "Too many requests. Please wait a moment and try again.";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";

/// Exchange error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExchangeError {
    pub kind: ExchangeErrorKind,
    pub message: String,
}

impl ExchangeError {
    pub fn new(kind: ExchangeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ExchangeErrorKind::Validation, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ExchangeErrorKind::Transport, message)
    }

    pub fn decoding(message: impl Into<String>) -> Self {
        Self::new(ExchangeErrorKind::Decoding, message)
    }

    /// Classify a non-success response from its status and raw body
    pub fn upstream(status: u16, body: &str) -> Self {
        let detail = parse_error_detail(body);
        let message = detail.unwrap_or_else(|| GENERIC_ERROR.to_string());
        Self::new(ExchangeErrorKind::Upstream { status }, message)
    }

    /// Text shown to the user in the transcript
    pub fn user_message(&self) -> String {
        match self.kind {
            ExchangeErrorKind::Upstream { status } => match status {
                400 => INVALID_REQUEST_ERROR.to_string(),
                429 => RATE_LIMIT_ERROR.to_string(),
                s if s >= 500 => SERVER_ERROR.to_string(),
                _ => self.message.clone(),
            },
            ExchangeErrorKind::Validation => INVALID_REQUEST_ERROR.to_string(),
            ExchangeErrorKind::Transport | ExchangeErrorKind::Decoding => {
                TRANSPORT_ERROR.to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeErrorKind {
    /// Empty or missing prompt, rejected before any I/O
    Validation,
    /// Connection refused, DNS failure, mid-stream disconnect
    Transport,
    /// Non-success status from the completion endpoint
    Upstream { status: u16 },
    /// Undecodable response body
    Decoding,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<serde_json::Value>,
}

/// Pull `error` or `detail` out of a JSON error body
///
/// `detail` may be a string or structured (validation errors); structured
/// details are rendered as compact JSON.
pub fn parse_error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
        return Some(error);
    }
    match parsed.detail? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}
