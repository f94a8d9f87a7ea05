//! The bounded generate-validate-retry loop.
//!
//! The model must report itself ready before anything is charged. Each
//! attempt charges the budget, calls the model, parses the response
//! against the strict schema and checks structural adherence. A first
//! attempt with discrepancies earns exactly one retry carrying those
//! discrepancies as feedback; a second failure is final. Schema failures,
//! budget refusals and provider errors end the loop immediately.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::budget::{BudgetExceeded, ESTIMATED_CALL_COST_CENTS, UsageBudget};
use crate::llm::{LlmError, PlanModel};
use crate::workout::{RequestValidationError, WorkoutPlan, WorkoutRequest, validate_request};

use super::adherence::evaluate_plan_adherence;
use super::artifact::artifact_id;
use super::prompt::{build_base_prompt, build_retry_prompt, structured_prompt};
use super::schema::{PlanSchemaError, parse_plan};

/// Upper bound on model calls per generation.
pub const MAX_GENERATION_ATTEMPTS: u32 = 2;

/// Errors from [`generate_plan`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestValidationError),

    #[error(transparent)]
    Schema(#[from] PlanSchemaError),

    #[error(
        "generated plan did not satisfy enforced constraints after {attempts} attempts:\n{}",
        .issues.join("\n")
    )]
    Adherence { issues: Vec<String>, attempts: u32 },

    #[error(transparent)]
    BudgetExceeded(#[from] BudgetExceeded),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// An accepted plan plus the bookkeeping the caller needs to store it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub plan: WorkoutPlan,
    /// `{millis}-{slug}`; names the export artifact.
    pub artifact_id: String,
    /// Model calls made, 1 or 2.
    pub attempts: u32,
}

/// Where the loop stands.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState {
    /// About to make the first call with the base prompt.
    First,
    /// First candidate had discrepancies; retry with them as feedback.
    Second { feedback: Vec<String> },
    Accepted { plan: WorkoutPlan, attempts: u32 },
    /// Second candidate still had discrepancies.
    Failed { issues: Vec<String> },
}

impl AttemptState {
    /// Transition after evaluating a candidate. Terminal states are
    /// returned unchanged.
    pub fn advance(self, candidate: WorkoutPlan, issues: Vec<String>) -> Self {
        match self {
            Self::First if issues.is_empty() => Self::Accepted {
                plan: candidate,
                attempts: 1,
            },
            Self::First => Self::Second { feedback: issues },
            Self::Second { .. } if issues.is_empty() => Self::Accepted {
                plan: candidate,
                attempts: MAX_GENERATION_ATTEMPTS,
            },
            Self::Second { .. } => Self::Failed { issues },
            terminal @ (Self::Accepted { .. } | Self::Failed { .. }) => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted { .. } | Self::Failed { .. })
    }
}

/// Generate a plan for `request`, making at most
/// [`MAX_GENERATION_ATTEMPTS`] model calls.
pub async fn generate_plan(
    model: &dyn PlanModel,
    budget: &UsageBudget,
    request: &WorkoutRequest,
) -> Result<GeneratedPlan, GenerationError> {
    validate_request(request)?;
    model.ready()?;

    let base_prompt = build_base_prompt(request);
    let mut state = AttemptState::First;

    loop {
        let (attempt, user_prompt) = match state {
            AttemptState::First => (1, base_prompt.clone()),
            AttemptState::Second { ref feedback } => {
                (2, build_retry_prompt(&base_prompt, feedback))
            }
            AttemptState::Accepted { plan, attempts } => {
                let artifact_id = artifact_id(&plan.program_name, &request.program_name);
                info!(
                    program = %plan.program_name,
                    attempts,
                    %artifact_id,
                    "plan accepted"
                );
                return Ok(GeneratedPlan {
                    plan,
                    artifact_id,
                    attempts,
                });
            }
            AttemptState::Failed { issues } => {
                warn!(issues = issues.len(), "plan rejected after final attempt");
                return Err(GenerationError::Adherence {
                    issues,
                    attempts: MAX_GENERATION_ATTEMPTS,
                });
            }
        };

        budget.charge(ESTIMATED_CALL_COST_CENTS)?;

        info!(
            attempt,
            model = model.name(),
            weeks = request.cycle_length_weeks,
            frequency = request.training_frequency,
            "requesting plan"
        );
        let raw = model.complete(&structured_prompt(user_prompt)).await?;
        let candidate = parse_plan(&raw)?;

        let issues = evaluate_plan_adherence(&candidate, request);
        if !issues.is_empty() {
            warn!(attempt, issues = ?issues, "candidate plan failed adherence");
        }
        state = state.advance(candidate, issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> WorkoutPlan {
        serde_json::from_value(neuraladapt_test_utils::sample_plan_json("p", 1, 1)).unwrap()
    }

    #[test]
    fn first_clean_candidate_is_accepted() {
        let state = AttemptState::First.advance(plan(), vec![]);
        assert!(matches!(state, AttemptState::Accepted { attempts: 1, .. }));
        assert!(state.is_terminal());
    }

    #[test]
    fn first_with_issues_moves_to_second() {
        let state = AttemptState::First.advance(plan(), vec!["bad".into()]);
        assert_eq!(
            state,
            AttemptState::Second {
                feedback: vec!["bad".into()]
            }
        );
        assert!(!state.is_terminal());
    }

    #[test]
    fn second_with_issues_fails() {
        let state = AttemptState::Second {
            feedback: vec!["a".into()],
        }
        .advance(plan(), vec!["b".into()]);
        assert_eq!(
            state,
            AttemptState::Failed {
                issues: vec!["b".into()]
            }
        );
    }

    #[test]
    fn second_clean_candidate_is_accepted() {
        let state = AttemptState::Second { feedback: vec![] }.advance(plan(), vec![]);
        assert!(matches!(state, AttemptState::Accepted { attempts: 2, .. }));
    }

    #[test]
    fn terminal_states_do_not_move() {
        let failed = AttemptState::Failed {
            issues: vec!["x".into()],
        };
        assert_eq!(failed.clone().advance(plan(), vec![]), failed);
    }

    #[test]
    fn adherence_error_lists_issues() {
        let err = GenerationError::Adherence {
            issues: vec!["one".into(), "two".into()],
            attempts: 2,
        };
        assert_eq!(
            err.to_string(),
            "generated plan did not satisfy enforced constraints after 2 attempts:\none\ntwo"
        );
    }
}
