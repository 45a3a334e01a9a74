//! Property-based tests for the topic navigator

use super::*;
use crate::topics::default_catalog;
use proptest::prelude::*;

/// A user action against whatever is currently visible
#[derive(Debug, Clone)]
enum Action {
    /// Pick the n-th root topic (modulo root count)
    Main(usize),
    /// Pick the n-th visible topic (modulo level size)
    Sub(usize),
    Back,
    FreeText,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..16).prop_map(Action::Main),
        (0usize..16).prop_map(Action::Sub),
        Just(Action::Back),
        Just(Action::FreeText),
    ]
}

fn apply(nav: &mut Navigator, action: &Action) -> Option<Selection> {
    match action {
        Action::Main(n) => {
            let label = nav.roots()[n % nav.roots().len()].label.clone();
            nav.select_main(&label).ok()
        }
        Action::Sub(n) => {
            let level = nav.visible_level();
            let label = level[n % level.len()].label.clone();
            nav.select_sub(&label).ok()
        }
        Action::Back => {
            nav.back();
            None
        }
        Action::FreeText => {
            nav.reset_on_free_text_entry();
            None
        }
    }
}

fn root_state() -> NavigatorState {
    Navigator::new(default_catalog()).state()
}

proptest! {
    #[test]
    fn free_text_reset_is_idempotent(actions in proptest::collection::vec(arb_action(), 0..20)) {
        let mut nav = Navigator::new(default_catalog());
        for action in &actions {
            apply(&mut nav, action);
        }
        nav.reset_on_free_text_entry();
        let once = nav.state();
        nav.reset_on_free_text_entry();
        prop_assert_eq!(&nav.state(), &once);
        prop_assert_eq!(once, root_state());
    }

    #[test]
    fn back_always_lands_on_root(actions in proptest::collection::vec(arb_action(), 0..20)) {
        let mut nav = Navigator::new(default_catalog());
        for action in &actions {
            apply(&mut nav, action);
        }
        nav.back();
        prop_assert_eq!(nav.state(), root_state());
    }

    #[test]
    fn breadcrumb_tracks_depth(actions in proptest::collection::vec(arb_action(), 0..30)) {
        let mut nav = Navigator::new(default_catalog());
        for action in &actions {
            apply(&mut nav, action);
            if nav.is_active() {
                prop_assert_eq!(nav.frames.len(), nav.breadcrumb().len() + 1);
                prop_assert!(!nav.visible_level().is_empty());
            } else {
                prop_assert!(nav.breadcrumb().is_empty());
                prop_assert_eq!(nav.visible_level().len(), nav.roots().len());
            }
        }
    }

    #[test]
    fn submitted_query_ends_with_leaf_and_resets(actions in proptest::collection::vec(arb_action(), 0..30)) {
        let mut nav = Navigator::new(default_catalog());
        for action in &actions {
            let path_before = nav.breadcrumb().to_vec();
            if let Some(Selection::Submit(query)) = apply(&mut nav, action) {
                prop_assert!(!nav.is_active());
                if matches!(action, Action::Sub(_)) {
                    prop_assert!(query.starts_with(&path_before.join(PATH_SEPARATOR)));
                }
            }
        }
    }
}
