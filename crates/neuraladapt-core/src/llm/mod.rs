//! LLM adapter: the [`PlanModel`] seam and an OpenAI-compatible client.

pub mod openai;
pub mod trait_def;
pub mod types;

pub use openai::{OpenAiConfig, OpenAiPlanModel};
pub use trait_def::PlanModel;
pub use types::{LlmError, StructuredPrompt};
