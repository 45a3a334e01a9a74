//! HTTP request handlers

use super::types::{ChatRequest, ErrorResponse, HealthResponse};
use super::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(relay_chat))
        .route("/health", get(health))
        .with_state(state)
}

// ============================================================
// Chat relay
// ============================================================

async fn relay_chat(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    // Parsed by hand: a malformed body is a server error here, not a 4xx
    let req: ChatRequest = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => serde_json::from_value(Value::Object(map))
            .map_err(|e| AppError::Internal(format!("Invalid request body: {e}")))?,
        Ok(Value::Null) => return Err(AppError::Internal("Request body is null".to_string())),
        Ok(_) => ChatRequest {
            prompt: Value::Null,
        },
        Err(e) => return Err(AppError::Internal(format!("Invalid request body: {e}"))),
    };

    if !req.has_prompt() {
        return Err(AppError::BadRequest("Prompt is required".to_string()));
    }

    let url = state.chat_url();
    tracing::debug!(url = %url, "Forwarding chat request");

    let response = state
        .client
        .post(&url)
        .json(&req)
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Backend unreachable: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read backend error: {e}")))?;
        let error: Value = serde_json::from_slice(&body).map_err(|e| {
            AppError::Internal(format!("Backend returned {status} with a non-JSON body: {e}"))
        })?;
        return Err(AppError::Upstream {
            status: status.as_u16(),
            body: error,
        });
    }

    tracing::info!(status = status.as_u16(), "Streaming backend answer");
    let stream = Body::from_stream(response.bytes_stream());
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        stream,
    )
        .into_response())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    /// Backend error relayed as-is
    Upstream { status: u16, body: Value },
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            AppError::Upstream { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                tracing::warn!(status = %status, "Relaying backend error");
                (status, Json(body)).into_response()
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Error in chat relay");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
