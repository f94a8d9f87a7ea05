//! Request and error types shared by every [`super::PlanModel`].

use serde_json::Value;
use thiserror::Error;

/// Everything needed for one structured-output completion.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPrompt {
    /// System instruction establishing the model's role.
    pub system: String,
    /// User prompt carrying the intake and guardrails.
    pub user: String,
    /// Name the response schema is registered under.
    pub schema_name: String,
    /// JSON schema the response must satisfy.
    pub schema: Value,
}

/// Failures talking to a model provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (set OPENAI_API_KEY or llm.api_key in the config file)")]
    MissingApiKey,

    #[error("failed to reach model provider: {0}")]
    Transport(String),

    #[error("model provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("model provider sent an unreadable response: {0}")]
    Decode(String),

    #[error("model response did not contain JSON output")]
    EmptyResponse,
}
