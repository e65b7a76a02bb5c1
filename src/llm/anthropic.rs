//! Anthropic Claude provider implementation

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";

/// Anthropic service implementation
pub struct AnthropicService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicService {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or(DEFAULT_ANTHROPIC_URL).to_string(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> AnthropicRequest {
        // No structured output mode here: the schema travels in the system prompt
        let system = match (&request.system, &request.response_schema) {
            (Some(system), Some(schema)) => Some(format!(
                "{system}\n\nRespond with a single JSON object matching this schema and nothing else:\n{schema}"
            )),
            (Some(system), None) => Some(system.clone()),
            (None, Some(schema)) => Some(format!(
                "Respond with a single JSON object matching this schema and nothing else:\n{schema}"
            )),
            (None, None) => None,
        };

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(1024),
            system,
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str().to_string(),
                    content: m.text.clone(),
                })
                .collect(),
        }
    }

    fn normalize_response(resp: AnthropicResponse) -> LlmResponse {
        let text = resp
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect::<String>();

        LlmResponse {
            text,
            usage: Usage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmService for AnthropicService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let anthropic_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let mut err = LlmError::from_status(status, &body);
            // Try to parse retry-after from response
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&body) {
                if let Some(retry_after) = parsed
                    .get("error")
                    .and_then(|e| e.get("retry_after"))
                    .and_then(serde_json::Value::as_f64)
                {
                    err = err.with_retry_after(Duration::from_secs_f64(retry_after));
                }
            }
            return Err(err);
        }

        let anthropic_response: AnthropicResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(anthropic_response))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
