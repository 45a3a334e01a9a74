//! Exchange state types

use crate::decode::Utf8StreamDecoder;
use crate::error::ExchangeErrorKind;
use std::fmt;

/// Lifecycle phase without per-state data, published to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    AwaitingFirstByte,
    Streaming,
    Completed,
    Errored,
}

impl RequestPhase {
    /// True while an exchange is in flight and new submits must be refused
    pub fn is_busy(self) -> bool {
        matches!(self, Self::AwaitingFirstByte | Self::Streaming)
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingFirstByte => "awaiting_first_byte",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Exchange state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Ready for a new submit
    #[default]
    Idle,

    /// Request sent, no response yet
    AwaitingFirstByte { query: String },

    /// Success status received, consuming the body
    Streaming {
        query: String,
        /// Decoded text received so far
        accumulated: String,
        decoder: Utf8StreamDecoder,
    },

    /// End of stream reached (transient, settles to Idle)
    Completed {
        query: String,
        content: String,
        /// Invalid byte sequences replaced with U+FFFD
        replacements: usize,
    },

    /// Exchange failed (transient, settles to Idle)
    Errored {
        query: String,
        kind: ExchangeErrorKind,
        /// User-facing text appended to the transcript
        message: String,
    },
}

impl RequestState {
    pub fn phase(&self) -> RequestPhase {
        match self {
            Self::Idle => RequestPhase::Idle,
            Self::AwaitingFirstByte { .. } => RequestPhase::AwaitingFirstByte,
            Self::Streaming { .. } => RequestPhase::Streaming,
            Self::Completed { .. } => RequestPhase::Completed,
            Self::Errored { .. } => RequestPhase::Errored,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Completed or Errored: finalization done, waiting to settle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Errored { .. })
    }
}
