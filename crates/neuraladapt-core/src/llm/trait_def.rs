//! The `PlanModel` trait -- the adapter interface for plan-generating models.
//!
//! The trait is object-safe so the workflow can hold `&dyn PlanModel` and
//! tests can substitute a scripted double.

use async_trait::async_trait;

use super::types::{LlmError, StructuredPrompt};

/// A model that answers a [`StructuredPrompt`] with raw JSON text.
#[async_trait]
pub trait PlanModel: Send + Sync {
    /// Human-readable name (e.g. the model id).
    fn name(&self) -> &str;

    /// Fail fast when a call could never be made, e.g. no credentials.
    /// Checked before any budget is spent.
    fn ready(&self) -> Result<(), LlmError> {
        Ok(())
    }

    /// Run one completion and return the response text unparsed.
    ///
    /// Implementations return [`LlmError::EmptyResponse`] rather than an
    /// empty string.
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, LlmError>;
}

// Compile-time assertion: PlanModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanModel) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Echoes the user prompt back, proving the trait works as `dyn PlanModel`.
    struct EchoModel;

    #[async_trait]
    impl PlanModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, LlmError> {
            if prompt.user.is_empty() {
                return Err(LlmError::EmptyResponse);
            }
            Ok(prompt.user.clone())
        }
    }

    fn prompt(user: &str) -> StructuredPrompt {
        StructuredPrompt {
            system: "sys".into(),
            user: user.into(),
            schema_name: "s".into(),
            schema: json!({}),
        }
    }

    #[test]
    fn plan_model_is_object_safe() {
        let model: Box<dyn PlanModel> = Box::new(EchoModel);
        assert_eq!(model.name(), "echo");
    }

    #[tokio::test]
    async fn echo_model_completes() {
        let model: Box<dyn PlanModel> = Box::new(EchoModel);
        assert_eq!(model.complete(&prompt("{}")).await.unwrap(), "{}");
        assert!(matches!(
            model.complete(&prompt("")).await,
            Err(LlmError::EmptyResponse)
        ));
    }
}
