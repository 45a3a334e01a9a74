//! Chat session
//!
//! The session is the context object tying the pieces together: it owns the
//! transcript, the history ledger and the navigator, forwards queries to the
//! streaming controller, and applies the controller's updates in order.

use crate::history::{HistoryId, HistoryLedger};
use crate::navigator::{NavigationError, Navigator, Selection};
use crate::runtime::{ControllerHandle, ControllerStopped};
use crate::state_machine::{ControllerUpdate, RequestPhase};
use crate::transcript::{MessageSource, Transcript};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Nothing to send")]
    Empty,
    #[error("Wait for the current answer to finish")]
    Busy,
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    ControllerStopped(#[from] ControllerStopped),
}

pub struct Session {
    transcript: Transcript,
    history: HistoryLedger,
    navigator: Navigator,
    controller: ControllerHandle,
    phase: RequestPhase,
    /// Set on dispatch, cleared when the controller settles back to Idle.
    /// Covers the gap before the first phase update arrives.
    in_flight: bool,
    has_interacted: bool,
}

impl Session {
    pub fn new(navigator: Navigator, controller: ControllerHandle) -> Self {
        Self {
            transcript: Transcript::new(),
            history: HistoryLedger::new(),
            navigator,
            controller,
            phase: RequestPhase::Idle,
            in_flight: false,
            has_interacted: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// False until the first submit or topic click
    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    /// Whether the input box accepts a submit right now
    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.phase.is_busy()
    }

    /// Submit free-form text typed by the user
    pub fn submit_text(&mut self, text: &str) -> Result<(), SubmitError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(SubmitError::Empty);
        }
        self.ensure_idle()?;

        self.has_interacted = true;
        self.navigator.reset_on_free_text_entry();
        self.dispatch(query.to_string(), MessageSource::Typed)
    }

    /// Click on a main topic
    pub fn choose_main(&mut self, label: &str) -> Result<Selection, SubmitError> {
        self.ensure_idle()?;
        let selection = self.navigator.select_main(label)?;
        self.has_interacted = true;

        if let Selection::Submit(query) = &selection {
            self.dispatch(query.clone(), MessageSource::MainTopic)?;
        }
        Ok(selection)
    }

    /// Click on a visible sub-topic
    pub fn choose_sub(&mut self, label: &str) -> Result<Selection, SubmitError> {
        self.ensure_idle()?;
        let selection = self.navigator.select_sub(label)?;

        if let Selection::Submit(query) = &selection {
            self.dispatch(query.clone(), MessageSource::SubTopic)?;
        }
        Ok(selection)
    }

    /// Click on a chip in the suggestion row
    ///
    /// Resolves against the visible sub-topics while the navigator is active,
    /// otherwise against the main topics. An unknown label at root level is
    /// sent as a query verbatim.
    pub fn activate_chip(&mut self, label: &str) -> Result<Selection, SubmitError> {
        if self.navigator.is_active() {
            return self.choose_sub(label);
        }
        if self.navigator.roots().iter().any(|n| n.label == label) {
            return self.choose_main(label);
        }

        self.ensure_idle()?;
        tracing::debug!(label = %label, "Chip is not a known topic, sending as-is");
        self.has_interacted = true;
        self.dispatch(label.to_string(), MessageSource::MainTopic)?;
        Ok(Selection::Submit(label.to_string()))
    }

    /// The "back to main topics" chip
    pub fn back_to_topics(&mut self) -> bool {
        self.navigator.back()
    }

    /// Mark a history entry active. The transcript is not reloaded.
    pub fn select_history(&mut self, id: &HistoryId) -> bool {
        self.history.select(id)
    }

    /// Apply one controller update
    pub fn apply(&mut self, update: ControllerUpdate) {
        match update {
            ControllerUpdate::PhaseChanged(phase) => {
                self.phase = phase;
                if phase == RequestPhase::Idle {
                    self.in_flight = false;
                }
            }
            ControllerUpdate::ThinkingStarted => self.transcript.show_thinking(),
            ControllerUpdate::LiveContent { content } => self.transcript.update_live(content),
            // Rendering follows the latest message on every frame
            ControllerUpdate::ScrollToLatest => {}
            ControllerUpdate::LiveCleared => self.transcript.clear_live(),
            ControllerUpdate::AssistantMessage { content } => {
                self.transcript.push_assistant(content);
            }
            ControllerUpdate::RecordHistory { query, content } => {
                let entry = self.history.record(query, &content);
                tracing::debug!(id = %entry.id.as_str(), preview = %entry.preview, "Recorded history entry");
            }
            ControllerUpdate::Rejected { query, reason } => {
                tracing::warn!(query = %query, reason = %reason, "Controller refused a query");
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), SubmitError> {
        if self.can_submit() {
            Ok(())
        } else {
            Err(SubmitError::Busy)
        }
    }

    fn dispatch(&mut self, query: String, source: MessageSource) -> Result<(), SubmitError> {
        // Topic files can carry whitespace-only queries
        if query.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        self.controller.dispatch(query.clone())?;
        self.transcript.push_user(query, source);
        self.in_flight = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::{default_catalog, TopicNode};
    use crate::transcript::{LiveSlot, Role};
    use tokio::sync::mpsc;

    fn session() -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(
            Navigator::new(default_catalog()),
            ControllerHandle::new(tx),
        );
        (session, rx)
    }

    fn settle(session: &mut Session, answer: &str, query: &str) {
        for update in [
            ControllerUpdate::PhaseChanged(RequestPhase::AwaitingFirstByte),
            ControllerUpdate::ThinkingStarted,
            ControllerUpdate::PhaseChanged(RequestPhase::Streaming),
            ControllerUpdate::LiveContent {
                content: answer.to_string(),
            },
            ControllerUpdate::LiveCleared,
            ControllerUpdate::AssistantMessage {
                content: answer.to_string(),
            },
            ControllerUpdate::RecordHistory {
                query: query.to_string(),
                content: answer.to_string(),
            },
            ControllerUpdate::PhaseChanged(RequestPhase::Completed),
            ControllerUpdate::PhaseChanged(RequestPhase::Idle),
        ] {
            session.apply(update);
        }
    }

    #[test]
    fn test_submit_text_dispatches_trimmed_query() {
        let (mut session, mut rx) = session();
        assert!(!session.has_interacted());

        session.submit_text("  VPN connection error \n").unwrap();

        assert_eq!(rx.try_recv().unwrap(), "VPN connection error");
        assert!(session.has_interacted());
        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "VPN connection error");
        assert_eq!(last.source, MessageSource::Typed);
    }

    #[test]
    fn test_empty_submit_is_refused() {
        let (mut session, mut rx) = session();
        assert_eq!(session.submit_text("   "), Err(SubmitError::Empty));
        assert!(rx.try_recv().is_err());
        assert!(session.transcript().is_empty());
        assert!(!session.has_interacted());
    }

    #[test]
    fn test_busy_until_idle() {
        let (mut session, mut rx) = session();
        session.submit_text("first").unwrap();
        assert!(!session.can_submit());
        assert_eq!(session.submit_text("second"), Err(SubmitError::Busy));
        assert_eq!(session.choose_main("Network Issues"), Err(SubmitError::Busy));

        settle(&mut session, "answer", "first");
        assert!(session.can_submit());
        session.submit_text("second").unwrap();

        assert_eq!(rx.try_recv().unwrap(), "first");
        assert_eq!(rx.try_recv().unwrap(), "second");
    }

    #[test]
    fn test_completed_exchange_updates_transcript_and_history() {
        let (mut session, _rx) = session();
        session.submit_text("VPN connection error").unwrap();
        settle(&mut session, "Try restarting your VPN client.", "VPN connection error");

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Try restarting your VPN client.");
        assert_eq!(session.transcript().live(), &LiveSlot::Empty);

        let entry = session.history().active_entry().unwrap();
        assert_eq!(entry.query, "VPN connection error");
        assert_eq!(entry.preview, "Try restarting your VPN client.");
    }

    #[test]
    fn test_branch_topic_expands_without_dispatch() {
        let (mut session, mut rx) = session();
        let selection = session.choose_main("Network Issues").unwrap();

        assert_eq!(selection, Selection::Expanded);
        assert!(session.has_interacted());
        assert!(session.navigator().is_active());
        assert!(session.transcript().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_leaf_sub_topic_dispatches_composed_query() {
        let (mut session, mut rx) = session();
        session.choose_main("Password Help").unwrap();
        let first = session.navigator().visible_level()[0].clone();
        let selection = session.choose_sub(&first.label).unwrap();

        let Selection::Submit(query) = selection else {
            panic!("expected a submit");
        };
        assert_eq!(rx.try_recv().unwrap(), query);
        assert!(!session.navigator().is_active());
        assert_eq!(
            session.transcript().last().unwrap().source,
            MessageSource::SubTopic
        );
    }

    #[test]
    fn test_chip_resolution() {
        let (mut session, mut rx) = session();

        // Root level: known main topic expands
        assert_eq!(
            session.activate_chip("Network Issues").unwrap(),
            Selection::Expanded
        );
        // Sub level: unknown label is an error, nothing sent
        assert!(matches!(
            session.activate_chip("Nope"),
            Err(SubmitError::Navigation(NavigationError::UnknownTopic(_)))
        ));
        assert!(session.back_to_topics());
        assert!(!session.back_to_topics());

        // Root level: unknown label falls back to a verbatim query
        assert_eq!(
            session.activate_chip("Reset my badge").unwrap(),
            Selection::Submit("Reset my badge".to_string())
        );
        assert_eq!(rx.try_recv().unwrap(), "Reset my badge");
    }

    #[test]
    fn test_blank_topic_query_leaves_session_ready() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::new(
            Navigator::new(vec![
                TopicNode::leaf("Blank").with_query("  "),
                TopicNode::leaf("Printer"),
            ]),
            ControllerHandle::new(tx),
        );

        assert_eq!(session.choose_main("Blank"), Err(SubmitError::Empty));
        assert!(rx.try_recv().is_err());
        assert!(session.transcript().is_empty());
        assert!(session.can_submit());

        session.submit_text("hello").unwrap();
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_typing_resets_navigation() {
        let (mut session, _rx) = session();
        session.choose_main("Network Issues").unwrap();
        session.submit_text("printer on fire").unwrap();
        assert!(!session.navigator().is_active());
    }

    #[test]
    fn test_error_exchange_records_nothing() {
        let (mut session, _rx) = session();
        session.submit_text("q").unwrap();
        for update in [
            ControllerUpdate::PhaseChanged(RequestPhase::AwaitingFirstByte),
            ControllerUpdate::ThinkingStarted,
            ControllerUpdate::LiveCleared,
            ControllerUpdate::AssistantMessage {
                content: crate::error::RATE_LIMIT_ERROR.to_string(),
            },
            ControllerUpdate::PhaseChanged(RequestPhase::Errored),
            ControllerUpdate::PhaseChanged(RequestPhase::Idle),
        ] {
            session.apply(update);
        }
        assert!(session.history().is_empty());
        assert!(session.can_submit());
        assert_eq!(
            session.transcript().last().unwrap().content,
            crate::error::RATE_LIMIT_ERROR
        );
    }

    #[test]
    fn test_select_history_keeps_transcript() {
        let (mut session, _rx) = session();
        session.submit_text("one").unwrap();
        settle(&mut session, "a1", "one");
        session.submit_text("two").unwrap();
        settle(&mut session, "a2", "two");

        let older = session.history().entries()[1].id.clone();
        assert!(session.select_history(&older));
        assert_eq!(session.history().active_id(), Some(&older));
        assert_eq!(session.transcript().len(), 4);
    }

    #[test]
    fn test_stopped_controller() {
        let (mut session, rx) = session();
        drop(rx);
        assert_eq!(
            session.submit_text("q"),
            Err(SubmitError::ControllerStopped(ControllerStopped))
        );
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_with_controller() {
        use crate::runtime::spawn_controller;
        use crate::runtime::testing::{MockTransport, ScriptedResponse};

        let transport = MockTransport::new();
        transport.queue(ScriptedResponse::stream(&["Check ", "the cable."]));
        let (handle, mut updates) = spawn_controller(transport);
        let mut session = Session::new(Navigator::new(default_catalog()), handle);

        session.submit_text("No internet").unwrap();
        while let Some(update) = updates.recv().await {
            let done = update == ControllerUpdate::PhaseChanged(RequestPhase::Idle);
            session.apply(update);
            if done {
                break;
            }
        }

        assert_eq!(session.transcript().last().unwrap().content, "Check the cable.");
        assert_eq!(session.history().len(), 1);
        assert!(session.can_submit());
    }
}
