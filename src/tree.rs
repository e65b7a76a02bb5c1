//! Lazily materialized discovery tree
//!
//! Children of a node are generated the first time anyone asks for them and
//! persisted, so every later visitor sees the same set. There is no lock
//! across read-generate-insert: two first visits racing on one parent may
//! both insert, which can leave more than [`CHILDREN_ACCEPTED`] children but
//! never two siblings with the same name.

use crate::db::{Candidate, Node, NodeId};
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::generator::Generator;
use crate::store::NodeStore;
use std::collections::HashSet;

/// Children kept from one generation batch
pub const CHILDREN_ACCEPTED: usize = 4;

/// Seed for an empty tree
const ROOT_DEFAULTS: [(&str, &str); 4] = [
    ("Water", "💧"),
    ("Fire", "🔥"),
    ("Air", "💨"),
    ("Earth", "🌍"),
];

/// Result of a children lookup
#[derive(Debug, Clone, Default)]
pub struct Children {
    pub nodes: Vec<Node>,
    /// Ids this call generated and persisted; empty on a cache hit
    pub discovered: Vec<NodeId>,
}

impl Children {
    fn cached(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            discovered: Vec::new(),
        }
    }
}

/// The tree engine. Only writer of nodes.
pub struct ContentTree<N, G> {
    store: N,
    generator: G,
}

impl<N: NodeStore, G: Generator> ContentTree<N, G> {
    pub fn new(store: N, generator: G) -> Self {
        Self { store, generator }
    }

    /// Point lookup
    pub async fn node(&self, id: NodeId) -> DiscoveryResult<Node> {
        self.store
            .node(id)
            .await?
            .ok_or(DiscoveryError::NotFound(id))
    }

    /// Persisted children of `parent`, generating them on first request.
    ///
    /// `actor` is recorded as the discoverer of anything generated here.
    pub async fn children(
        &self,
        parent: Option<NodeId>,
        actor: &str,
    ) -> DiscoveryResult<Children> {
        let existing = self.store.children(parent).await?;
        if !existing.is_empty() {
            return Ok(Children::cached(existing));
        }

        let inserted = match parent {
            None => self.seed_root().await?,
            Some(id) => self.generate_children(id, actor).await?,
        };

        // Re-read: a concurrent first visit may have inserted too
        let nodes = self.store.children(parent).await?;
        debug_assert!(
            siblings_unique(&nodes),
            "duplicate sibling names under {parent:?}"
        );

        Ok(Children {
            nodes,
            discovered: inserted.iter().map(|n| n.id).collect(),
        })
    }

    async fn seed_root(&self) -> DiscoveryResult<Vec<Node>> {
        let defaults: Vec<Candidate> = ROOT_DEFAULTS
            .iter()
            .map(|(name, emoji)| Candidate::new(*name, Some(emoji)))
            .collect();
        let inserted = self.store.insert_children(None, None, &defaults).await?;
        tracing::info!(count = inserted.len(), "Seeded root nodes");
        // Root defaults are not credited to anyone
        Ok(Vec::new())
    }

    async fn generate_children(&self, parent_id: NodeId, actor: &str) -> DiscoveryResult<Vec<Node>> {
        let parent = self.node(parent_id).await?;
        let candidates = self.generator.generate(&parent.name).await?;
        let offered = candidates.len();
        let accepted = accept_candidates(candidates);

        let inserted = self
            .store
            .insert_children(Some(parent_id), Some(actor), &accepted)
            .await?;

        tracing::info!(
            parent_id,
            parent = %parent.name,
            actor,
            offered,
            inserted = inserted.len(),
            "Generated children"
        );
        Ok(inserted)
    }
}

/// Drop in-batch duplicates, keep the first `CHILDREN_ACCEPTED`
fn accept_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .take(CHILDREN_ACCEPTED)
        .collect()
}

fn siblings_unique(nodes: &[Node]) -> bool {
    let mut seen = HashSet::new();
    nodes.iter().all(|n| seen.insert(n.name.as_str()))
}
