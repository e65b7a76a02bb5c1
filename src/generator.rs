//! Candidate generation for unexplored nodes
//!
//! Asks an LLM for items related to a parent item. Transport failures are
//! retried with exponential backoff when the provider marks them retryable;
//! anything else surfaces as a [`GenerationError`].

use crate::db::Candidate;
use crate::error::GenerationError;
use crate::llm::{LlmError, LlmRequest, LlmService};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Batch size requested from the model. Oversized so dedup losses still
/// leave enough to fill a menu.
pub const CANDIDATES_REQUESTED: usize = 10;

const SYSTEM_PROMPT: &str = "You are a creative assistant that generates items for a discovery game. Each item needs a name and an emoji.";

const MAX_NAME_CHARS: usize = 48;

/// Produces candidate children for a named parent
#[async_trait]
pub trait Generator: Send + Sync {
    /// Always a (possibly empty) list on success
    async fn generate(&self, parent_name: &str) -> Result<Vec<Candidate>, GenerationError>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn generate(&self, parent_name: &str) -> Result<Vec<Candidate>, GenerationError> {
        (**self).generate(parent_name).await
    }
}

/// Generator backed by an LLM service
pub struct LlmGenerator {
    llm: Arc<dyn LlmService>,
    max_attempts: u32,
    attempt_timeout: Duration,
    backoff: Duration,
}

impl LlmGenerator {
    pub fn new(llm: Arc<dyn LlmService>, max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            llm,
            max_attempts: max_attempts.max(1),
            attempt_timeout,
            backoff: Duration::from_secs(1),
        }
    }

    /// Base delay before the first retry; doubles on each further attempt
    #[allow(dead_code)] // Tests run without delays
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn build_request(parent_name: &str) -> LlmRequest {
        LlmRequest::user(format!(
            "Generate {CANDIDATES_REQUESTED} items that can be derived from or are related to \"{parent_name}\"."
        ))
        .with_system(SYSTEM_PROMPT)
        .with_schema(items_schema())
        .with_max_tokens(1024)
    }

    /// Exponential backoff: base, 2x base, 4x base...
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff * (1 << (attempt - 1).min(6))
    }

    fn retry_delay(&self, attempt: u32, err: &LlmError) -> Duration {
        let exponential = self.backoff_delay(attempt);
        err.retry_after.map_or(exponential, |after| after.max(exponential))
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, parent_name: &str) -> Result<Vec<Candidate>, GenerationError> {
        let request = Self::build_request(parent_name);
        let mut attempt = 1;

        loop {
            let result = timeout(self.attempt_timeout, self.llm.complete(&request)).await;
            match result {
                Ok(Ok(response)) => {
                    let candidates = parse_candidates(&response.text)?;
                    tracing::debug!(
                        parent = %parent_name,
                        count = candidates.len(),
                        attempt,
                        "Generated candidates"
                    );
                    return Ok(candidates);
                }
                Ok(Err(e)) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.retry_delay(attempt, &e);
                    tracing::warn!(
                        parent = %parent_name,
                        attempt,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Ok(Err(e)) => return Err(GenerationError::Upstream(e)),
                // A stalled attempt is retried like a transport failure
                Err(_) if attempt < self.max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        parent = %parent_name,
                        attempt,
                        delay_ms = %delay.as_millis(),
                        timeout_ms = %self.attempt_timeout.as_millis(),
                        "Generation attempt timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(_) => {
                    tracing::warn!(parent = %parent_name, attempt, "Generation timed out");
                    return Err(GenerationError::Timeout(self.attempt_timeout));
                }
            }
        }
    }
}

fn items_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "emoji": { "type": "string" }
                    },
                    "required": ["name", "emoji"]
                },
                "minItems": CANDIDATES_REQUESTED,
                "maxItems": CANDIDATES_REQUESTED
            }
        },
        "required": ["items"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedBatch {
    Wrapped {
        #[serde(default)]
        items: Vec<GeneratedItem>,
    },
    Bare(Vec<GeneratedItem>),
}

#[derive(Debug, Deserialize)]
struct GeneratedItem {
    name: String,
    #[serde(default)]
    emoji: Option<String>,
}

/// Parse the model's reply into candidates.
///
/// Tolerates code fences and chatter around the JSON. Blank names are
/// dropped; the order of the reply is kept.
fn parse_candidates(text: &str) -> Result<Vec<Candidate>, GenerationError> {
    let json_text = extract_json(text)
        .ok_or_else(|| GenerationError::Malformed(format!("no JSON in reply: {}", preview(text))))?;

    let batch: GeneratedBatch = serde_json::from_str(json_text)
        .map_err(|e| GenerationError::Malformed(format!("{e}: {}", preview(text))))?;
    let items = match batch {
        GeneratedBatch::Wrapped { items } | GeneratedBatch::Bare(items) => items,
    };

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let name: String = item.name.trim().chars().take(MAX_NAME_CHARS).collect();
            if name.is_empty() {
                return None;
            }
            let emoji = item.emoji.as_deref().map(str::trim).filter(|e| !e.is_empty());
            Some(Candidate::new(name, emoji))
        })
        .collect())
}

fn extract_json(text: &str) -> Option<&str> {
    let object = text.find('{').zip(text.rfind('}'));
    let array = text.find('[').zip(text.rfind(']'));
    let (start, end) = match (object, array) {
        (Some(o), Some(a)) => {
            if a.0 < o.0 {
                a
            } else {
                o
            }
        }
        (Some(o), None) => o,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    (start < end).then(|| text.get(start..=end)).flatten()
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}
