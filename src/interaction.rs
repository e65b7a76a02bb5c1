//! Transport-neutral interaction boundary types

use crate::menu::Control;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbound event from a chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub actor_id: String,
    pub conversation_id: String,
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A slash command such as `start` or `/menu@SomeBot`
    Command { name: String },
    /// A control id from a rendered menu
    Control { id: String },
    Text { text: String },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Command { .. } => "command",
            Action::Control { .. } => "control",
            Action::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Post a new message
    Send,
    /// Replace the menu message the control came from
    Edit,
    /// Remove the menu message
    Close,
    /// Nothing to deliver
    Ignore,
}

/// What the transport should do in reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderInstruction {
    pub mode: RenderMode,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Vec<Control>>,
}

impl RenderInstruction {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            mode: RenderMode::Send,
            text: text.into(),
            controls: Vec::new(),
        }
    }

    pub fn close() -> Self {
        Self {
            mode: RenderMode::Close,
            text: String::new(),
            controls: Vec::new(),
        }
    }

    pub fn ignore() -> Self {
        Self {
            mode: RenderMode::Ignore,
            text: String::new(),
            controls: Vec::new(),
        }
    }
}
