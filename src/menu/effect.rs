//! Effects produced by menu transitions

use crate::db::NodeId;

/// Work for the engine, run in order. A failing effect aborts the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch (and on first visit generate) the children of a node
    LoadChildren { node_id: Option<NodeId> },

    /// Build the menu message for the new position
    Render {
        delivery: Delivery,
        notice: Option<Notice>,
    },

    /// Persist the navigation state
    PersistSession,

    /// Persist which rendering is live
    PersistProgress,

    /// Remove the menu message
    CloseMenu,
}

/// How a rendering reaches the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A new menu message
    Send,
    /// Replace the message whose control was pressed
    Edit,
}

/// Extra line shown above the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The pressed control came from an older menu
    Outdated,
    /// Back was pressed with nowhere to go
    NoHistory,
    /// The selected item is not on the current menu
    Unavailable,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::Outdated => "⚠️ That menu was outdated, here is the current one.",
            Notice::NoHistory => "⚠️ Nothing to go back to.",
            Notice::Unavailable => "⚠️ That item is not on this menu.",
        }
    }
}
