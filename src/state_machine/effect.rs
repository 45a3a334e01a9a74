//! Effects produced by state transitions

use super::state::RequestPhase;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the prompt to the completion endpoint
    OpenRequest { query: String },

    /// Suspend until the transport delivers the next chunk, end of stream, or an error
    ReadNextChunk,

    /// Publish an update to the session
    Notify(ControllerUpdate),
}

/// Updates published by the controller, applied by the session in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerUpdate {
    PhaseChanged(RequestPhase),
    /// Show the thinking indicator
    ThinkingStarted,
    /// Current accumulated text of the live assistant message
    LiveContent { content: String },
    ScrollToLatest,
    LiveCleared,
    /// Append a finalized assistant message (answer or error text)
    AssistantMessage { content: String },
    /// Record a completed exchange in the history ledger
    RecordHistory { query: String, content: String },
    /// A submit was refused without starting an exchange
    Rejected { query: String, reason: String },
}

impl Effect {
    pub fn notify_phase(phase: RequestPhase) -> Self {
        Effect::Notify(ControllerUpdate::PhaseChanged(phase))
    }

    pub fn notify_live(content: impl Into<String>) -> Self {
        Effect::Notify(ControllerUpdate::LiveContent {
            content: content.into(),
        })
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::Notify(ControllerUpdate::AssistantMessage {
            content: content.into(),
        })
    }

    pub fn record_history(query: impl Into<String>, content: impl Into<String>) -> Self {
        Effect::Notify(ControllerUpdate::RecordHistory {
            query: query.into(),
            content: content.into(),
        })
    }
}
