//! Per-conversation navigation state

use crate::db::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no history to go back to")]
    NoHistory,
}

/// Where a conversation is in the tree and what it has seen.
///
/// `None` as a node id means the tree root, both for the current position
/// and for history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub current_node_id: Option<NodeId>,
    #[serde(default)]
    pub history: Vec<Option<NodeId>>,
    #[serde(default)]
    pub total_selections: u64,
    #[serde(default)]
    pub viewed_node_ids: BTreeSet<NodeId>,
    #[serde(default)]
    pub discovered_node_ids: BTreeSet<NodeId>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl NavigationState {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            current_node_id: None,
            history: Vec::new(),
            total_selections: 0,
            viewed_node_ids: BTreeSet::new(),
            discovered_node_ids: BTreeSet::new(),
        }
    }

    /// Move into `node_id`, remembering where we came from
    pub fn enter(&mut self, node_id: NodeId) {
        self.history.push(self.current_node_id);
        self.current_node_id = Some(node_id);
        self.total_selections += 1;
        self.viewed_node_ids.insert(node_id);
    }

    /// Return to the previous position
    pub fn back(&mut self) -> Result<(), NavigationError> {
        let previous = self.history.pop().ok_or(NavigationError::NoHistory)?;
        self.current_node_id = previous;
        Ok(())
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Credit nodes this session caused to be generated
    pub fn record_discovered(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.discovered_node_ids.extend(ids);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            depth: self.history.len(),
            discovered: self.discovered_node_ids.len(),
            viewed: self.viewed_node_ids.len(),
            pressed: self.total_selections,
        }
    }
}

/// Snapshot shown to the user after every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub depth: usize,
    pub discovered: usize,
    pub viewed: usize,
    pub pressed: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🧭 Depth: {} · 🔍 Discovered: {} · 👀 Viewed: {} · 👆 Pressed: {}",
            self.depth, self.discovered, self.viewed, self.pressed
        )
    }
}
