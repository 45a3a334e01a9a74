//! Pure state transition function
//!
//! Given the same state and event this always produces the same new state
//! and effects, with no I/O.

use super::{ControllerUpdate, Effect, Event, RequestPhase, RequestState};
use crate::decode::Utf8StreamDecoder;
use crate::error::ExchangeError;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RequestState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: RequestState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in progress")]
    Busy,
    #[error("Prompt is required")]
    EmptyPrompt,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &RequestState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================
        (RequestState::Idle, Event::Submit { query }) => {
            if query.trim().is_empty() {
                return Err(TransitionError::EmptyPrompt);
            }
            Ok(
                TransitionResult::new(RequestState::AwaitingFirstByte {
                    query: query.clone(),
                })
                .with_effect(Effect::notify_phase(RequestPhase::AwaitingFirstByte))
                .with_effect(Effect::Notify(ControllerUpdate::ThinkingStarted))
                .with_effect(Effect::OpenRequest { query }),
            )
        }

        // At most one exchange in flight; finalizing states settle immediately
        (_, Event::Submit { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Response head
        // ============================================================
        (RequestState::AwaitingFirstByte { query }, Event::ResponseOpened { .. }) => Ok(
            TransitionResult::new(RequestState::Streaming {
                query: query.clone(),
                accumulated: String::new(),
                decoder: Utf8StreamDecoder::new(),
            })
            .with_effect(Effect::notify_phase(RequestPhase::Streaming))
            // Replaces the thinking indicator
            .with_effect(Effect::notify_live(""))
            .with_effect(Effect::ReadNextChunk),
        ),

        (RequestState::AwaitingFirstByte { query }, Event::ResponseRejected { status, body }) => {
            Ok(errored(query, &ExchangeError::upstream(status, &body)))
        }

        // ============================================================
        // Body
        // ============================================================
        (
            RequestState::Streaming {
                query,
                accumulated,
                decoder,
            },
            Event::Chunk { bytes },
        ) => {
            let mut decoder = decoder.clone();
            let mut accumulated = accumulated.clone();
            accumulated.push_str(&decoder.decode(&bytes));

            let published = accumulated.clone();
            Ok(TransitionResult::new(RequestState::Streaming {
                query: query.clone(),
                accumulated,
                decoder,
            })
            .with_effect(Effect::notify_live(published))
            .with_effect(Effect::Notify(ControllerUpdate::ScrollToLatest))
            .with_effect(Effect::ReadNextChunk))
        }

        (
            RequestState::Streaming {
                query,
                accumulated,
                decoder,
            },
            Event::EndOfStream,
        ) => {
            let mut decoder = decoder.clone();
            let mut content = accumulated.clone();
            content.push_str(&decoder.finish());

            Ok(TransitionResult::new(RequestState::Completed {
                query: query.clone(),
                content: content.clone(),
                replacements: decoder.replacements(),
            })
            .with_effect(Effect::Notify(ControllerUpdate::LiveCleared))
            .with_effect(Effect::append_assistant(content.clone()))
            .with_effect(Effect::record_history(query.clone(), content))
            .with_effect(Effect::notify_phase(RequestPhase::Completed)))
        }

        // ============================================================
        // Transport failure (partial content is discarded)
        // ============================================================
        (
            RequestState::AwaitingFirstByte { query } | RequestState::Streaming { query, .. },
            Event::TransportFailed { message },
        ) => Ok(errored(query, &ExchangeError::transport(message))),

        // ============================================================
        // Settle
        // ============================================================
        (RequestState::Completed { .. } | RequestState::Errored { .. }, Event::Settled) => {
            Ok(TransitionResult::new(RequestState::Idle)
                .with_effect(Effect::notify_phase(RequestPhase::Idle)))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            state.phase(),
            event.name()
        ))),
    }
}

fn errored(query: &str, error: &ExchangeError) -> TransitionResult {
    let message = error.user_message();
    TransitionResult::new(RequestState::Errored {
        query: query.to_string(),
        kind: error.kind,
        message: message.clone(),
    })
    .with_effect(Effect::Notify(ControllerUpdate::LiveCleared))
    .with_effect(Effect::append_assistant(message))
    .with_effect(Effect::notify_phase(RequestPhase::Errored))
}
