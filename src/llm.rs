//! LLM provider abstraction
//!
//! Provides a common interface for the generative backends the item
//! generator can talk to.

mod anthropic;
mod error;
mod openai;
mod registry;
mod types;

pub use anthropic::AnthropicService;
pub use error::{LlmError, LlmErrorKind};
pub use openai::OpenAIService;
pub use registry::{build_service, LlmConfig};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Records model, latency and token usage of every generation call
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let started = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();
        let structured = request.response_schema.is_some();

        match &result {
            Ok(response) => tracing::info!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                structured,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                reply_chars = response.text.chars().count(),
                "Generation call completed"
            ),
            // Retryable failures are retried by the caller; only hard ones are errors
            Err(e) if e.is_retryable() => tracing::warn!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                kind = ?e.kind,
                error = %e.message,
                "Generation call failed"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                kind = ?e.kind,
                error = %e.message,
                "Generation call failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
