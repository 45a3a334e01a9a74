//! Streaming controller executor

use super::traits::{ChunkStream, CompletionTransport};
use crate::error::ExchangeError;
use crate::state_machine::{
    transition, ControllerUpdate, Effect, Event, RequestPhase, RequestState, TransitionError,
    TransitionResult,
};
use futures::StreamExt;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// How a submitted exchange ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Completed { content: String, replacements: usize },
    Errored { message: String },
    /// The submit was refused; no exchange took place
    Rejected(TransitionError),
}

/// Drives one exchange at a time through the state machine
///
/// The controller owns the lifecycle state, the response body, and the
/// accumulator. Everything the UI needs is published as `ControllerUpdate`s.
pub struct StreamingController<T>
where
    T: CompletionTransport + 'static,
{
    state: RequestState,
    transport: Arc<T>,
    updates: mpsc::UnboundedSender<ControllerUpdate>,
    /// Body of the response being streamed
    body: Option<ChunkStream>,
    /// Submit commands; only read between exchanges or to refuse them mid-exchange
    commands: Option<mpsc::UnboundedReceiver<String>>,
}

impl<T> StreamingController<T>
where
    T: CompletionTransport + 'static,
{
    pub fn new(transport: T, updates: mpsc::UnboundedSender<ControllerUpdate>) -> Self {
        Self {
            state: RequestState::Idle,
            transport: Arc::new(transport),
            updates,
            body: None,
            commands: None,
        }
    }

    pub fn phase(&self) -> RequestPhase {
        self.state.phase()
    }

    /// Serve submit commands until the sending side is dropped
    pub async fn run(mut self, commands: mpsc::UnboundedReceiver<String>) {
        tracing::info!(endpoint = %self.transport.endpoint(), "Starting streaming controller");
        self.commands = Some(commands);

        loop {
            let Some(commands) = self.commands.as_mut() else {
                break;
            };
            let Some(query) = commands.recv().await else {
                break;
            };
            self.submit(query).await;
        }

        tracing::info!("Streaming controller stopped");
    }

    /// Run one exchange to completion. Never fails: every error path ends in
    /// `Errored` and a user-facing message.
    pub async fn submit(&mut self, query: String) -> ExchangeOutcome {
        let started = Instant::now();
        let query_len = query.chars().count();

        let outcome = match self.process(Event::Submit { query }).await {
            Ok(outcome) => outcome,
            Err(TransitionError::EmptyPrompt) => {
                let message = ExchangeError::validation("empty prompt").user_message();
                tracing::warn!("Refusing empty prompt");
                self.notify(ControllerUpdate::AssistantMessage {
                    content: message.clone(),
                });
                // Nothing was opened, but the session still waits for Idle
                self.notify(ControllerUpdate::PhaseChanged(RequestPhase::Idle));
                ExchangeOutcome::Errored { message }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Submit refused");
                ExchangeOutcome::Rejected(e)
            }
        };

        match &outcome {
            ExchangeOutcome::Completed {
                content,
                replacements,
            } => tracing::info!(
                duration_ms = %started.elapsed().as_millis(),
                query_chars = query_len,
                answer_chars = content.chars().count(),
                invalid_utf8 = replacements,
                "Exchange completed"
            ),
            ExchangeOutcome::Errored { message } => tracing::warn!(
                duration_ms = %started.elapsed().as_millis(),
                query_chars = query_len,
                message = %message,
                "Exchange failed"
            ),
            ExchangeOutcome::Rejected(_) => {}
        }

        outcome
    }

    /// Feed an event through the state machine, executing effects until the
    /// exchange settles. Only the initial event may be refused.
    async fn process(&mut self, event: Event) -> Result<ExchangeOutcome, TransitionError> {
        let first = transition(&self.state, event)?;
        let mut pending = VecDeque::new();
        let mut outcome = None;
        self.apply(first, &mut pending, &mut outcome).await;

        while let Some(event) = pending.pop_front() {
            match transition(&self.state, event) {
                Ok(result) => self.apply(result, &mut pending, &mut outcome).await,
                Err(e) => {
                    // Runtime bug: recover to Idle rather than wedge the input
                    tracing::error!(error = %e, "Unexpected transition failure mid-exchange");
                    self.abandon();
                    return Ok(ExchangeOutcome::Errored {
                        message: ExchangeError::transport(e.to_string()).user_message(),
                    });
                }
            }
        }

        Ok(outcome.unwrap_or_else(|| ExchangeOutcome::Errored {
            message: ExchangeError::transport("exchange ended without finalizing").user_message(),
        }))
    }

    async fn apply(
        &mut self,
        result: TransitionResult,
        pending: &mut VecDeque<Event>,
        outcome: &mut Option<ExchangeOutcome>,
    ) {
        tracing::debug!(from = %self.state.phase(), to = %result.new_state.phase(), "Transition");
        self.state = result.new_state;

        match &self.state {
            RequestState::Completed {
                content,
                replacements,
                ..
            } => {
                *outcome = Some(ExchangeOutcome::Completed {
                    content: content.clone(),
                    replacements: *replacements,
                });
            }
            RequestState::Errored { message, .. } => {
                *outcome = Some(ExchangeOutcome::Errored {
                    message: message.clone(),
                });
            }
            _ => {}
        }

        for effect in result.effects {
            if let Some(generated) = self.execute_effect(effect).await {
                pending.push_back(generated);
            }
        }

        if self.state.is_terminal() {
            // Drop any unread body; partial content is already discarded
            self.body = None;
            pending.push_back(Event::Settled);
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Notify(update) => {
                self.notify(update);
                None
            }
            Effect::OpenRequest { query } => Some(self.open_request(query).await),
            Effect::ReadNextChunk => Some(self.read_next_chunk().await),
        }
    }

    async fn open_request(&mut self, query: String) -> Event {
        let transport = Arc::clone(&self.transport);
        let sent = self
            .refusing_submits(async move { transport.send(&query).await })
            .await;

        match sent {
            Ok(response) if response.is_success() => {
                let status = response.status;
                self.body = Some(response.body);
                Event::ResponseOpened { status }
            }
            Ok(response) => {
                let status = response.status;
                let body = self.refusing_submits(collect_error_body(response.body)).await;
                Event::ResponseRejected { status, body }
            }
            Err(e) => Event::TransportFailed { message: e.message },
        }
    }

    async fn read_next_chunk(&mut self) -> Event {
        let Some(mut body) = self.body.take() else {
            return Event::TransportFailed {
                message: "response body missing".to_string(),
            };
        };

        let next = self.refusing_submits(body.next()).await;
        match next {
            Some(Ok(bytes)) => {
                self.body = Some(body);
                Event::Chunk { bytes }
            }
            Some(Err(e)) => Event::TransportFailed { message: e.message },
            None => Event::EndOfStream,
        }
    }

    /// Await `fut`, refusing any submit that arrives meanwhile
    async fn refusing_submits<F: Future>(&mut self, fut: F) -> F::Output {
        tokio::pin!(fut);
        loop {
            let Some(commands) = self.commands.as_mut() else {
                return fut.await;
            };
            let query = tokio::select! {
                out = &mut fut => return out,
                Some(query) = commands.recv() => query,
            };
            self.refuse(query);
        }
    }

    fn refuse(&self, query: String) {
        let reason = match transition(&self.state, Event::Submit {
            query: query.clone(),
        }) {
            Err(e) => e.to_string(),
            Ok(_) => TransitionError::Busy.to_string(),
        };
        tracing::warn!(reason = %reason, "Refusing concurrent submit");
        self.notify(ControllerUpdate::Rejected { query, reason });
    }

    fn abandon(&mut self) {
        self.body = None;
        self.state = RequestState::Idle;
        self.notify(ControllerUpdate::LiveCleared);
        self.notify(ControllerUpdate::AssistantMessage {
            content: ExchangeError::transport("abandoned").user_message(),
        });
        self.notify(ControllerUpdate::PhaseChanged(RequestPhase::Idle));
    }

    fn notify(&self, update: ControllerUpdate) {
        // A closed channel only means nobody is rendering any more
        let _ = self.updates.send(update);
    }
}

/// Read a whole error body. A body that fails to arrive is treated as empty.
async fn collect_error_body(mut body: ChunkStream) -> String {
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(e) => {
                tracing::debug!(error = %e, "Error body truncated");
                return String::new();
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
