//! Events that can occur during an exchange

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    Submit { query: String },

    // Transport events
    /// Success status with a readable body
    ResponseOpened { status: u16 },
    /// Non-success status; `body` is the full error payload
    ResponseRejected { status: u16, body: String },
    Chunk { bytes: Vec<u8> },
    EndOfStream,
    /// Connection failed before or during the body
    TransportFailed { message: String },

    // Runtime events
    /// Finalization effects have run; return to Idle
    Settled,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::ResponseOpened { .. } => "response_opened",
            Event::ResponseRejected { .. } => "response_rejected",
            Event::Chunk { .. } => "chunk",
            Event::EndOfStream => "end_of_stream",
            Event::TransportFailed { .. } => "transport_failed",
            Event::Settled => "settled",
        }
    }
}
