//! OpenAI-compatible `chat/completions` client with strict JSON-schema output.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use super::trait_def::PlanModel;
use super::types::{LlmError, StructuredPrompt};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CONNECT_TIMEOUT_SECS: u64 = 10;
// Full multi-week plans are long; generation routinely takes over a minute.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`PlanModel`] backed by an OpenAI-compatible HTTP API.
pub struct OpenAiPlanModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiPlanModel {
    /// Build a client. Fails only if the HTTP client cannot be constructed;
    /// a missing API key is reported on the first call.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))?;

        info!(base_url = %config.base_url, model = %config.model, "initialized model client");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Pull the provider's message out of an error body, falling back to a
    /// truncated copy of the raw text.
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_owned()
                } else {
                    trimmed.chars().take(500).collect()
                }
            });
        LlmError::Provider {
            status: status.as_u16(),
            message,
        }
    }

    /// Extract the JSON text from a successful response body.
    fn extract_content(body: &str) -> Result<String, LlmError> {
        let response: ChatResponse =
            serde_json::from_str(body).map_err(|e| LlmError::Decode(e.to_string()))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(LlmError::EmptyResponse)?;

        if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
            return Err(LlmError::Provider {
                status: 200,
                message: format!("model refused: {refusal}"),
            });
        }

        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

impl OpenAiPlanModel {
    fn api_key(&self) -> Result<&str, LlmError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)
    }
}

#[async_trait]
impl PlanModel for OpenAiPlanModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn ready(&self) -> Result<(), LlmError> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, LlmError> {
        let api_key = self.api_key()?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &prompt.schema_name,
                    schema: &prompt.schema,
                    strict: true,
                },
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.user.len(), "sending completion request");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "model request failed");
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let content = Self::extract_content(&body)?;
        debug!(response_chars = content.len(), "received completion");
        Ok(content)
    }
}
