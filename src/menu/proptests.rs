//! Property-based tests for the menu state machine

use super::*;
use crate::session::NavigationState;
use chrono::Utc;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Input {
    Open,
    Resume,
    /// Press a control on the live rendering
    Fresh(ControlAction),
    /// Press a control on a rendering `lag` revisions old
    Stale(ControlAction, u64),
}

fn arb_action() -> impl Strategy<Value = ControlAction> {
    prop_oneof![
        (1i64..20).prop_map(ControlAction::Select),
        Just(ControlAction::Back),
        Just(ControlAction::Close),
    ]
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        1 => Just(Input::Open),
        1 => Just(Input::Resume),
        6 => arb_action().prop_map(Input::Fresh),
        2 => (arb_action(), 1u64..4).prop_map(|(a, lag)| Input::Stale(a, lag)),
    ]
}

fn to_event(input: &Input, progress: MenuProgress) -> MenuEvent {
    match input {
        Input::Open => MenuEvent::Open,
        Input::Resume => MenuEvent::Resume,
        Input::Fresh(action) => {
            MenuEvent::Press(ControlPress::new(progress.phase, progress.revision, *action))
        }
        Input::Stale(action, lag) => MenuEvent::Press(ControlPress::new(
            progress.phase,
            progress.revision.wrapping_sub(*lag),
            *action,
        )),
    }
}

fn render_of(effects: &[Effect]) -> Option<(Delivery, Option<Notice>)> {
    effects.iter().find_map(|e| match e {
        Effect::Render { delivery, notice } => Some((*delivery, *notice)),
        _ => None,
    })
}

proptest! {
    #[test]
    fn prop_edits_always_alternate(inputs in proptest::collection::vec(arb_input(), 1..40)) {
        let mut nav = NavigationState::default();
        let mut progress = MenuProgress::default();

        for input in &inputs {
            let result = transition(&nav, progress, to_event(input, progress), Utc::now());

            if let Some((Delivery::Edit, _)) = render_of(&result.effects) {
                prop_assert_ne!(result.progress.phase, progress.phase);
            }
            if render_of(&result.effects).is_some() {
                prop_assert_eq!(result.progress.revision, progress.revision + 1);
            } else {
                prop_assert_eq!(result.progress, progress);
            }

            nav = result.nav;
            progress = result.progress;
        }
    }

    #[test]
    fn prop_stale_presses_never_move(
        inputs in proptest::collection::vec(arb_input(), 0..20),
        action in arb_action(),
        lag in 1u64..5,
    ) {
        let mut nav = NavigationState::default();
        let mut progress = MenuProgress::default();
        for input in &inputs {
            let result = transition(&nav, progress, to_event(input, progress), Utc::now());
            nav = result.nav;
            progress = result.progress;
        }

        let stale = to_event(&Input::Stale(action, lag), progress);
        let result = transition(&nav, progress, stale, Utc::now());

        prop_assert_eq!(&result.nav, &nav);
        if action != ControlAction::Close {
            prop_assert_eq!(
                render_of(&result.effects),
                Some((Delivery::Edit, Some(Notice::Outdated)))
            );
        }
    }

    #[test]
    fn prop_back_only_when_offered(inputs in proptest::collection::vec(arb_input(), 0..30)) {
        let mut nav = NavigationState::default();
        let mut progress = MenuProgress::default();

        for input in &inputs {
            let offered = nav.can_go_back();
            let event = to_event(input, progress);
            let result = transition(&nav, progress, event, Utc::now());

            if matches!(input, Input::Fresh(ControlAction::Back)) {
                if offered {
                    prop_assert_eq!(result.nav.history.len(), nav.history.len() - 1);
                } else {
                    prop_assert_eq!(
                        render_of(&result.effects),
                        Some((Delivery::Edit, Some(Notice::NoHistory)))
                    );
                }
            }

            nav = result.nav;
            progress = result.progress;
        }
    }

    #[test]
    fn prop_persistence_follows_loading(inputs in proptest::collection::vec(arb_input(), 1..30)) {
        let mut nav = NavigationState::default();
        let mut progress = MenuProgress::default();

        for input in &inputs {
            let result = transition(&nav, progress, to_event(input, progress), Utc::now());

            let load = result.effects.iter().position(|e| matches!(e, Effect::LoadChildren { .. }));
            let persist = result.effects.iter().position(|e| matches!(e, Effect::PersistSession));
            if let Some(persist) = persist {
                prop_assert!(load.is_some_and(|load| load < persist));
            }

            nav = result.nav;
            progress = result.progress;
        }
    }
}
