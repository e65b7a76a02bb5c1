//! Pure menu transition function

use super::{ControlAction, ControlPress, Delivery, Effect, MenuEvent, MenuProgress, Notice, Phase};
use crate::session::NavigationState;
use chrono::{DateTime, Utc};

/// Result of a menu transition
#[derive(Debug)]
pub struct TransitionResult {
    pub nav: NavigationState,
    pub progress: MenuProgress,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(nav: NavigationState, progress: MenuProgress) -> Self {
        Self {
            nav,
            progress,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Render the current position of `nav` and persist both records.
    ///
    /// Progress goes first: if the session write then fails, the old menu
    /// is already outdated and cannot replay against the old position.
    fn show(self, delivery: Delivery, notice: Option<Notice>) -> Self {
        let node_id = self.nav.current_node_id;
        self.with_effects([
            Effect::LoadChildren { node_id },
            Effect::Render { delivery, notice },
            Effect::PersistProgress,
            Effect::PersistSession,
        ])
    }
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs. Every rendering
/// of an existing menu message uses the phase opposite to the live one.
pub fn transition(
    nav: &NavigationState,
    progress: MenuProgress,
    event: MenuEvent,
    now: DateTime<Utc>,
) -> TransitionResult {
    match event {
        MenuEvent::Open => {
            let mut nav = nav.clone();
            nav.reset(now);
            TransitionResult::new(nav, progress.advance(Phase::A)).show(Delivery::Send, None)
        }

        MenuEvent::Resume => TransitionResult::new(nav.clone(), progress.advance(Phase::A))
            .show(Delivery::Send, None),

        MenuEvent::Refresh(notice) => refresh(nav, progress, notice),

        // Close works from any rendering, outdated or not
        MenuEvent::Press(ControlPress {
            action: ControlAction::Close,
            ..
        }) => TransitionResult::new(nav.clone(), progress).with_effect(Effect::CloseMenu),

        MenuEvent::Press(press) if !progress.is_current(press.phase, press.revision) => {
            refresh(nav, progress, Notice::Outdated)
        }

        MenuEvent::Press(ControlPress {
            action: ControlAction::Select(node_id),
            ..
        }) => {
            let mut nav = nav.clone();
            nav.enter(node_id);
            TransitionResult::new(nav, progress.advance(progress.phase.opposite()))
                .show(Delivery::Edit, None)
        }

        MenuEvent::Press(ControlPress {
            action: ControlAction::Back,
            ..
        }) => {
            let mut next = nav.clone();
            match next.back() {
                Ok(()) => TransitionResult::new(next, progress.advance(progress.phase.opposite()))
                    .show(Delivery::Edit, None),
                Err(_) => refresh(nav, progress, Notice::NoHistory),
            }
        }
    }
}

/// Re-render the current position with a notice
fn refresh(nav: &NavigationState, progress: MenuProgress, notice: Notice) -> TransitionResult {
    TransitionResult::new(nav.clone(), progress.advance(progress.phase.opposite()))
        .show(Delivery::Edit, Some(notice))
}
