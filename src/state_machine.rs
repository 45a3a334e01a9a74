//! Exchange lifecycle state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime feeds events in, executes the returned effects, and feeds any
//! events those effects generate back in.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{ControllerUpdate, Effect};
pub use event::Event;
pub use state::{RequestPhase, RequestState};
pub use transition::{transition, TransitionError, TransitionResult};
