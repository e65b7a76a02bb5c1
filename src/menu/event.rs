//! Events that drive the menu, and the control id codec

use super::effect::Notice;
use super::state::Phase;
use crate::db::NodeId;

/// Events accepted by [`super::transition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// Start over from the root with fresh stats
    Open,
    /// Show the current position again without touching the session
    Resume,
    /// A control on a rendered menu was pressed
    Press(ControlPress),
    /// Show the current position again in place, with a notice
    Refresh(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Select(NodeId),
    Back,
    Close,
}

/// A decoded control id.
///
/// Ids look like `a:7:sel:42`, `b:8:back` or `a:9:close`: the phase and
/// revision of the rendering the control belongs to, then the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPress {
    pub phase: Phase,
    pub revision: u64,
    pub action: ControlAction,
}

impl ControlPress {
    pub fn new(phase: Phase, revision: u64, action: ControlAction) -> Self {
        Self {
            phase,
            revision,
            action,
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        let mut parts = id.splitn(3, ':');
        let phase = Phase::parse(parts.next()?)?;
        let revision = parts.next()?.parse().ok()?;
        let action = match parts.next()? {
            "back" => ControlAction::Back,
            "close" => ControlAction::Close,
            rest => {
                let node_id = rest.strip_prefix("sel:")?.parse().ok()?;
                ControlAction::Select(node_id)
            }
        };
        Some(Self::new(phase, revision, action))
    }

    pub fn id(&self) -> String {
        let prefix = format!("{}:{}", self.phase.as_str(), self.revision);
        match self.action {
            ControlAction::Select(node_id) => format!("{prefix}:sel:{node_id}"),
            ControlAction::Back => format!("{prefix}:back"),
            ControlAction::Close => format!("{prefix}:close"),
        }
    }
}
