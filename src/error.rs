//! Error taxonomy for the discovery engine
//!
//! Every core operation returns one of these; the interaction boundary turns
//! them into user-visible messages.

use crate::db::{DbError, NodeId};
use crate::llm::LlmError;
use std::time::Duration;
use thiserror::Error;

/// The generative call failed or produced nothing usable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Upstream(#[from] LlmError),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("unusable generation output: {0}")]
    Malformed(String),
}

/// A key-value or node store operation failed
#[derive(Debug, Error)]
#[error("persistence failure: {message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(e: DbError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("record encoding: {e}"))
    }
}

/// Failure of one interaction
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("node {0} not found")]
    NotFound(NodeId),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DiscoveryError {
    /// Message shown to the actor. Internals stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            DiscoveryError::NotFound(_) => {
                "⚠️ That item no longer exists. Send /start to begin again."
            }
            DiscoveryError::Generation(_) => {
                "⚠️ Could not discover anything new right now. Please try again."
            }
            DiscoveryError::Persistence(_) => "⚠️ Something went wrong. Please try again.",
        }
    }
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
