//! Database schema and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    payload BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_created ON records(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_records_updated ON records(updated_at DESC);

CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    decoration TEXT,
    parent_id INTEGER,
    discovered_by TEXT,
    created_at TEXT NOT NULL,

    FOREIGN KEY (parent_id) REFERENCES nodes(id)
);

CREATE INDEX IF NOT EXISTS idx_nodes_name ON nodes(name);
CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id);
CREATE INDEX IF NOT EXISTS idx_nodes_discovered_by ON nodes(discovered_by);
CREATE INDEX IF NOT EXISTS idx_nodes_created ON nodes(created_at DESC);
";

/// Store-assigned node identifier
pub type NodeId = i64;

/// One entry in the discovery tree. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub decoration: Option<String>,
    pub parent_id: Option<NodeId>,
    pub discovered_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Button label: decoration followed by the name
    pub fn label(&self) -> String {
        match self.decoration.as_deref() {
            Some(decoration) if !decoration.is_empty() => format!("{decoration} {}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// A child proposed for insertion, before it has an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub decoration: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, decoration: Option<&str>) -> Self {
        Self {
            name: name.into(),
            decoration: decoration.map(String::from),
        }
    }
}
