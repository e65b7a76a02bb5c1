//! Alternating discovery menu
//!
//! Pure transitions in the Elm style: `transition` maps the stored
//! navigation and menu progress plus an event to new values and a list of
//! effects for the engine to run. The chat UI cannot re-render a menu onto
//! itself, so consecutive renders alternate between two phases.

mod effect;
pub mod event;
mod render;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Delivery, Effect, Notice};
pub use event::{ControlAction, ControlPress, MenuEvent};
pub use render::{render, Control};
pub use state::{MenuProgress, Phase};
pub use transition::{transition, TransitionResult};
