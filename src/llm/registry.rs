//! Provider selection from configuration

use super::anthropic::DEFAULT_ANTHROPIC_MODEL;
use super::{AnthropicService, LlmError, LlmService, LoggingService, OpenAIService};
use std::sync::Arc;
use std::time::Duration;

/// Default model on Workers AI's OpenAI-compatible endpoint
pub const DEFAULT_OPENAI_MODEL: &str = "@cf/meta/llama-4-scout-17b-16e-instruct";

/// Which wire dialect to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
}

impl Provider {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "openai-compatible" | "workers-ai" => Some(Self::OpenAI),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }
}

/// Configuration for the generative backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Full endpoint URL; provider default when unset
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
    /// Total attempts per generation, including the first
    pub max_attempts: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            base_url: None,
            model: None,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let provider = std::env::var("LLM_PROVIDER").ok().map_or(defaults.provider, |p| {
            Provider::parse(&p).unwrap_or_else(|| {
                tracing::warn!(provider = %p, "Unknown LLM_PROVIDER, using openai");
                Provider::OpenAI
            })
        });

        Self {
            provider,
            api_key: std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("LLM_BASE_URL").ok().filter(|u| !u.is_empty()),
            model: std::env::var("LLM_MODEL").ok().filter(|m| !m.is_empty()),
            timeout: std::env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
            max_attempts: std::env::var("LLM_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_attempts),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider {
            Provider::OpenAI => DEFAULT_OPENAI_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        })
    }
}

/// Build the configured service, wrapped with request logging
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| LlmError::auth("LLM_API_KEY is not set"))?;
    let model = config.model_name().to_string();
    let base_url = config.base_url.as_deref();

    let service: Arc<dyn LlmService> = match config.provider {
        Provider::OpenAI => Arc::new(OpenAIService::new(api_key, model, base_url, config.timeout)?),
        Provider::Anthropic => {
            Arc::new(AnthropicService::new(api_key, model, base_url, config.timeout)?)
        }
    };

    Ok(Arc::new(LoggingService::new(service)))
}
