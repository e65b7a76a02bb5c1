//! Mock implementations for testing
//!
//! These mocks enable engine and tree tests without SQLite or network I/O.

use crate::db::{Candidate, Node, NodeId};
use crate::error::{GenerationError, PersistenceError};
use crate::generator::{Generator, CANDIDATES_REQUESTED};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::store::{KeyValueStore, NodeStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Per-call stalls before answering, consumed in order
    delays: Mutex<VecDeque<Duration>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delays: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Stall the next call for `delay` before it answers
    pub fn queue_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")));
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock Generator
// ============================================================================

/// Generator with scripted replies.
///
/// With nothing queued it answers with `CANDIDATES_REQUESTED` distinct names
/// derived from the parent ("Fire 1", "Fire 2", ...).
pub struct MockGenerator {
    replies: Mutex<VecDeque<Result<Vec<Candidate>, GenerationError>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Barrier>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every call at `barrier` before replying
    pub fn with_gate(mut self, barrier: Arc<Barrier>) -> Self {
        self.gate = Some(barrier);
        self
    }

    pub fn queue_names(&self, names: &[&str]) {
        let candidates = names.iter().map(|n| Candidate::new(*n, Some("🔹"))).collect();
        self.replies.lock().unwrap().push_back(Ok(candidates));
    }

    pub fn queue_error(&self, error: GenerationError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Parent names this generator was asked about, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, parent_name: &str) -> Result<Vec<Candidate>, GenerationError> {
        self.calls.lock().unwrap().push(parent_name.to_string());
        let reply = self.replies.lock().unwrap().pop_front();

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        reply.unwrap_or_else(|| {
            Ok((1..=CANDIDATES_REQUESTED)
                .map(|i| Candidate::new(format!("{parent_name} {i}"), Some("🔹")))
                .collect())
        })
    }
}

// ============================================================================
// In-Memory Storage
// ============================================================================

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, Vec<u8>>,
    nodes: Vec<Node>,
}

/// In-memory storage with failure injection
pub struct InMemoryStorage {
    state: Mutex<MemoryState>,
    fail_inserts: AtomicBool,
    fail_writes: AtomicBool,
    fail_prefix: Mutex<Option<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fail_inserts: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_prefix: Mutex::new(None),
        }
    }

    /// Make node inserts fail until reset
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make record upserts and deletes fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make record writes under `prefix` fail; `None` clears it
    pub fn set_fail_writes_under(&self, prefix: Option<&str>) {
        *self.fail_prefix.lock().unwrap() = prefix.map(str::to_string);
    }

    fn check_write(&self, key: &str) -> Result<(), PersistenceError> {
        let prefixed = self
            .fail_prefix
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|p| key.starts_with(p));
        if prefixed || self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::new("injected write failure"));
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    pub fn record_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state.lock().unwrap().records.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.state.lock().unwrap().records.get(key).cloned())
    }

    async fn upsert(&self, key: &str, payload: &[u8]) -> Result<(), PersistenceError> {
        self.check_write(key)?;
        self.state
            .lock()
            .unwrap()
            .records
            .insert(key.to_string(), payload.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        self.check_write(key)?;
        self.state.lock().unwrap().records.remove(key);
        Ok(())
    }
}

#[async_trait]
impl NodeStore for InMemoryStorage {
    async fn children(&self, parent: Option<NodeId>) -> Result<Vec<Node>, PersistenceError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .filter(|n| n.parent_id == parent)
            .cloned()
            .collect())
    }

    async fn node(&self, id: NodeId) -> Result<Option<Node>, PersistenceError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn insert_children(
        &self,
        parent: Option<NodeId>,
        discovered_by: Option<&str>,
        candidates: &[Candidate],
    ) -> Result<Vec<Node>, PersistenceError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PersistenceError::new("injected insert failure"));
        }

        let mut state = self.state.lock().unwrap();
        let mut taken: HashSet<String> = state
            .nodes
            .iter()
            .filter(|n| n.parent_id == parent)
            .map(|n| n.name.clone())
            .collect();

        let mut inserted = Vec::new();
        for candidate in candidates {
            if !taken.insert(candidate.name.clone()) {
                continue;
            }
            let id = NodeId::try_from(state.nodes.len()).unwrap() + 1;
            let node = Node {
                id,
                name: candidate.name.clone(),
                decoration: candidate.decoration.clone(),
                parent_id: parent,
                discovered_by: discovered_by.map(String::from),
                created_at: Utc::now(),
            };
            state.nodes.push(node.clone());
            inserted.push(node);
        }
        Ok(inserted)
    }
}
