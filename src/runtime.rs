//! Runtime for executing exchanges
//!
//! The controller runs as its own task. The session talks to it through a
//! command channel and receives `ControllerUpdate`s in order.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ExchangeOutcome, StreamingController};
pub use traits::*;

use crate::state_machine::ControllerUpdate;
use thiserror::Error;
use tokio::sync::mpsc;

/// The controller task has exited
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Streaming controller is not running")]
pub struct ControllerStopped;

/// Handle to submit prompts to a running controller
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<String>,
}

impl ControllerHandle {
    pub fn new(commands: mpsc::UnboundedSender<String>) -> Self {
        Self { commands }
    }

    /// Queue a prompt. A prompt sent mid-exchange comes back as
    /// `ControllerUpdate::Rejected`.
    pub fn dispatch(&self, query: impl Into<String>) -> Result<(), ControllerStopped> {
        self.commands
            .send(query.into())
            .map_err(|_| ControllerStopped)
    }
}

/// Spawn a controller task over `transport`
pub fn spawn_controller<T>(transport: T) -> (ControllerHandle, mpsc::UnboundedReceiver<ControllerUpdate>)
where
    T: CompletionTransport + 'static,
{
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let controller = StreamingController::new(transport, update_tx);
    tokio::spawn(controller.run(command_rx));

    (ControllerHandle::new(command_tx), update_rx)
}
