//! Control layout for a menu rendering

use super::{ControlAction, ControlPress, Phase};
use crate::db::Node;
use serde::{Deserialize, Serialize};

const CONTROLS_PER_ROW: usize = 2;

/// A pressable control as handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub label: String,
}

impl Control {
    fn new(press: ControlPress, label: impl Into<String>) -> Self {
        Self {
            id: press.id(),
            label: label.into(),
        }
    }
}

/// Rows of controls: children two per row, then Back (when there is
/// history) and Close on a final row. Same inputs, same layout.
pub fn render(
    phase: Phase,
    revision: u64,
    children: &[Node],
    can_go_back: bool,
) -> Vec<Vec<Control>> {
    let press = |action| ControlPress::new(phase, revision, action);

    let mut rows: Vec<Vec<Control>> = children
        .chunks(CONTROLS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|node| Control::new(press(ControlAction::Select(node.id)), node.label()))
                .collect()
        })
        .collect();

    let mut nav_row = Vec::with_capacity(2);
    if can_go_back {
        nav_row.push(Control::new(press(ControlAction::Back), "⬅️ Back"));
    }
    nav_row.push(Control::new(press(ControlAction::Close), "✖️ Close"));
    rows.push(nav_row);

    rows
}
