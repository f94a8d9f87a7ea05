//! Shared helpers for neuraladapt-core integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use neuraladapt_core::llm::{LlmError, PlanModel, StructuredPrompt};
use neuraladapt_core::workout::WorkoutRequest;
use neuraladapt_test_utils::{sample_plan_json, sample_request_json};

/// A model that replays queued responses and records every prompt.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<StructuredPrompt>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replays the given raw texts as successful responses.
    pub fn replying(texts: Vec<String>) -> Self {
        Self::new(texts.into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<StructuredPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}

/// The sample intake with the given week count and frequency.
pub fn request(name: &str, weeks: u32, frequency: u32) -> WorkoutRequest {
    let mut request: WorkoutRequest =
        serde_json::from_value(sample_request_json(name)).expect("sample request parses");
    request.cycle_length_weeks = weeks;
    request.training_frequency = frequency;
    request
}

/// Raw model output for a plan of `weeks` weeks with `sessions` sessions each.
pub fn plan_text(name: &str, weeks: u32, sessions: u32) -> String {
    sample_plan_json(name, weeks, sessions).to_string()
}

/// Raw model output that claims `declared` weeks but only contains `actual`.
pub fn short_plan_text(name: &str, declared: u32, actual: u32, sessions: u32) -> String {
    let mut value = sample_plan_json(name, actual, sessions);
    value["cycleLengthWeeks"] = declared.into();
    value.to_string()
}
