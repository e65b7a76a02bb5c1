//! Storage traits consumed by the engine
//!
//! These traits let the engine run against SQLite in production and
//! in-memory mocks in tests.

use crate::db::{Candidate, Database, Node, NodeId};
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable string key to opaque bytes. Keys are not interpreted; callers own
/// their prefixes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Insert or replace
    async fn upsert(&self, key: &str, payload: &[u8]) -> Result<(), PersistenceError>;

    async fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Persistent home of the discovery tree
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Children of `parent` (root level when `None`), oldest first
    async fn children(&self, parent: Option<NodeId>) -> Result<Vec<Node>, PersistenceError>;

    async fn node(&self, id: NodeId) -> Result<Option<Node>, PersistenceError>;

    /// Insert all candidates or none. Names already present among the
    /// siblings at insert time are skipped. Returns the inserted rows.
    async fn insert_children(
        &self,
        parent: Option<NodeId>,
        discovered_by: Option<&str>,
        candidates: &[Candidate],
    ) -> Result<Vec<Node>, PersistenceError>;
}

/// Combined storage trait for convenience
pub trait Storage: KeyValueStore + NodeStore {}
impl<T: KeyValueStore + NodeStore> Storage for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).read(key).await
    }

    async fn upsert(&self, key: &str, payload: &[u8]) -> Result<(), PersistenceError> {
        (**self).upsert(key, payload).await
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).delete(key).await
    }
}

#[async_trait]
impl<T: NodeStore + ?Sized> NodeStore for Arc<T> {
    async fn children(&self, parent: Option<NodeId>) -> Result<Vec<Node>, PersistenceError> {
        (**self).children(parent).await
    }

    async fn node(&self, id: NodeId) -> Result<Option<Node>, PersistenceError> {
        (**self).node(id).await
    }

    async fn insert_children(
        &self,
        parent: Option<NodeId>,
        discovered_by: Option<&str>,
        candidates: &[Candidate],
    ) -> Result<Vec<Node>, PersistenceError> {
        (**self)
            .insert_children(parent, discovered_by, candidates)
            .await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter to use Database as Storage
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for DatabaseStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.db.read_record(key)?)
    }

    async fn upsert(&self, key: &str, payload: &[u8]) -> Result<(), PersistenceError> {
        Ok(self.db.upsert_record(key, payload)?)
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        Ok(self.db.delete_record(key)?)
    }
}

#[async_trait]
impl NodeStore for DatabaseStorage {
    async fn children(&self, parent: Option<NodeId>) -> Result<Vec<Node>, PersistenceError> {
        Ok(self.db.get_children(parent)?)
    }

    async fn node(&self, id: NodeId) -> Result<Option<Node>, PersistenceError> {
        Ok(self.db.get_node(id)?)
    }

    async fn insert_children(
        &self,
        parent: Option<NodeId>,
        discovered_by: Option<&str>,
        candidates: &[Candidate],
    ) -> Result<Vec<Node>, PersistenceError> {
        Ok(self.db.insert_children(parent, discovered_by, candidates)?)
    }
}
