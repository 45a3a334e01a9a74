//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::decode::Utf8StreamDecoder;
use crate::error::ExchangeErrorKind;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Split `bytes` at the given (sorted, deduplicated) cut points
fn split_at_cuts(bytes: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for point in points {
        chunks.push(bytes[start..point].to_vec());
        start = point;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

/// Longest valid UTF-8 prefix of `bytes`
fn valid_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap(),
    }
}

fn open_stream(query: &str) -> RequestState {
    let opened = transition(
        &RequestState::AwaitingFirstByte {
            query: query.to_string(),
        },
        Event::ResponseOpened { status: 200 },
    )
    .unwrap();
    opened.new_state
}

fn live_content(result: &TransitionResult) -> Option<&str> {
    result.effects.iter().find_map(|e| match e {
        Effect::Notify(ControllerUpdate::LiveContent { content }) => Some(content.as_str()),
        _ => None,
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    // Mix of ASCII, 2-, 3- and 4-byte characters
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just(' '),
            Just('é'),
            Just('ñ'),
            Just('€'),
            Just('中'),
            Just('🔒'),
            Just('😀'),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_busy_state() -> impl Strategy<Value = RequestState> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(|query| RequestState::AwaitingFirstByte { query }),
        ("[a-z ]{1,20}", "[a-z ]{0,20}").prop_map(|(query, accumulated)| {
            RequestState::Streaming {
                query,
                accumulated,
                decoder: Utf8StreamDecoder::new(),
            }
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z ]{0,10}".prop_map(|query| Event::Submit { query }),
        (200u16..300).prop_map(|status| Event::ResponseOpened { status }),
        (400u16..600, "[a-z{}\":]{0,20}")
            .prop_map(|(status, body)| Event::ResponseRejected { status, body }),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(|bytes| Event::Chunk { bytes }),
        Just(Event::EndOfStream),
        "[a-z ]{1,10}".prop_map(|message| Event::TransportFailed { message }),
        Just(Event::Settled),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Live content after chunk k is the decoded concatenation of chunks 1..=k,
    /// wherever the chunk boundaries fall relative to multi-byte characters.
    #[test]
    fn live_content_is_decoded_prefix(
        text in arb_text(),
        cuts in proptest::collection::vec(0usize..200, 0..10),
    ) {
        let bytes = text.as_bytes();
        let chunks = split_at_cuts(bytes, &cuts);

        let mut state = open_stream("q");
        let mut consumed = 0;
        let mut previous_len = 0;
        for chunk in chunks {
            consumed += chunk.len();
            let result = transition(&state, Event::Chunk { bytes: chunk }).unwrap();
            let live = live_content(&result).unwrap();
            prop_assert_eq!(live, valid_prefix(&bytes[..consumed]));
            prop_assert!(live.len() >= previous_len);
            previous_len = live.len();
            state = result.new_state;
        }

        let done = transition(&state, Event::EndOfStream).unwrap();
        prop_assert_eq!(
            done.new_state,
            RequestState::Completed { query: "q".to_string(), content: text, replacements: 0 }
        );
    }

    /// Arbitrary bytes never fail the exchange
    #[test]
    fn arbitrary_bytes_always_complete(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..12), 0..10),
    ) {
        let mut state = open_stream("q");
        for chunk in chunks {
            state = transition(&state, Event::Chunk { bytes: chunk }).unwrap().new_state;
        }
        let done = transition(&state, Event::EndOfStream).unwrap();
        prop_assert_eq!(done.new_state.phase(), RequestPhase::Completed);
    }

    /// A second submit is refused while an exchange is in flight
    #[test]
    fn busy_states_reject_submit(state in arb_busy_state(), query in "[a-z]{1,10}") {
        let result = transition(&state, Event::Submit { query });
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    /// Any non-empty prompt moves Idle to AwaitingFirstByte
    #[test]
    fn idle_accepts_non_empty_prompt(query in "[a-zA-Z0-9 ]{0,5}[a-zA-Z0-9][a-zA-Z0-9 ]{0,30}") {
        let result = transition(&RequestState::Idle, Event::Submit { query: query.clone() }).unwrap();
        prop_assert_eq!(result.new_state, RequestState::AwaitingFirstByte { query });
    }

    /// Every error path ends in exactly one assistant message and no history record
    #[test]
    fn errors_produce_one_message_and_no_history(
        state in arb_busy_state(),
        status in 400u16..600,
        body in "[a-z{}\":]{0,20}",
        mid_stream in any::<bool>(),
    ) {
        let event = match (&state, mid_stream) {
            (RequestState::AwaitingFirstByte { .. }, false) => Event::ResponseRejected { status, body },
            _ => Event::TransportFailed { message: body },
        };
        let result = transition(&state, event).unwrap();

        let messages = result.effects.iter()
            .filter(|e| matches!(e, Effect::Notify(ControllerUpdate::AssistantMessage { .. })))
            .count();
        let records = result.effects.iter()
            .filter(|e| matches!(e, Effect::Notify(ControllerUpdate::RecordHistory { .. })))
            .count();
        prop_assert_eq!(messages, 1);
        prop_assert_eq!(records, 0);
        let is_errored = matches!(result.new_state, RequestState::Errored { .. });
        prop_assert!(is_errored);
    }

    /// Random event sequences never panic, and every accepted exchange that
    /// reaches a terminal state settles back to Idle.
    #[test]
    fn random_sequences_are_safe(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = RequestState::Idle;
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            if state.is_terminal() {
                state = transition(&state, Event::Settled).unwrap().new_state;
                prop_assert_eq!(&state, &RequestState::Idle);
            }
        }
    }

    /// Upstream errors keep their status in the error kind
    #[test]
    fn upstream_status_preserved(status in 400u16..600) {
        let result = transition(
            &RequestState::AwaitingFirstByte { query: "q".to_string() },
            Event::ResponseRejected { status, body: String::new() },
        ).unwrap();
        let preserved = matches!(
            result.new_state,
            RequestState::Errored { kind: ExchangeErrorKind::Upstream { status: s }, .. } if s == status
        );
        prop_assert!(preserved);
    }
}
