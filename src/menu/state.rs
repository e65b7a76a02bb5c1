//! Menu progress types

use serde::{Deserialize, Serialize};

/// One of the two interchangeable menu identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    A,
    B,
}

impl Phase {
    pub fn opposite(self) -> Self {
        match self {
            Phase::A => Phase::B,
            Phase::B => Phase::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::A => "a",
            Phase::B => "b",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "a" => Some(Phase::A),
            "b" => Some(Phase::B),
            _ => None,
        }
    }
}

/// Which menu rendering is live for a conversation.
///
/// Controls carry the phase and revision they were rendered with; a press
/// that does not match is from an outdated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuProgress {
    pub phase: Phase,
    pub revision: u64,
}

impl MenuProgress {
    /// Progress after rendering `phase`
    pub fn advance(self, phase: Phase) -> Self {
        Self {
            phase,
            revision: self.revision + 1,
        }
    }

    pub fn is_current(self, phase: Phase, revision: u64) -> bool {
        self.phase == phase && self.revision == revision
    }
}
