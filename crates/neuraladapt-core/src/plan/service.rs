//! Plan service layer.
//!
//! Ties the generation workflow to the store and the exporter: generate,
//! write the workbook, then persist. A failed export never blocks saving
//! the plan; the record is stored without an artifact path.

use std::path::Path;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::budget::UsageBudget;
use crate::export::export_plan;
use crate::llm::PlanModel;
use crate::workout::{WorkoutPlan, WorkoutRequest};

use super::store::{self, StoredWorkoutPlan};
use super::workflow::{GenerationError, generate_plan};

/// Errors from the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("plan {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// What generation needs besides the store.
#[derive(Clone, Copy)]
pub struct Generator<'a> {
    pub model: &'a dyn PlanModel,
    pub budget: &'a UsageBudget,
    pub artifact_dir: &'a Path,
}

/// Result of a generate-and-store run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub stored: StoredWorkoutPlan,
    pub attempts: u32,
}

impl GenerationOutcome {
    pub fn plan(&self) -> Option<&WorkoutPlan> {
        self.stored.response_payload.as_ref()
    }
}

/// Generate a plan for `request`, export it, and save request, plan and
/// artifact path as a new record.
pub async fn generate_and_store(
    pool: &SqlitePool,
    user_id: &str,
    request: &WorkoutRequest,
    generator: Generator<'_>,
) -> Result<GenerationOutcome, ServiceError> {
    let generated = generate_plan(generator.model, generator.budget, request).await?;
    let artifact_path = export_artifact(&generated.plan, generator.artifact_dir, &generated.artifact_id);

    let stored = store::save_plan(
        pool,
        user_id,
        request,
        Some(&generated.plan),
        artifact_path.as_deref(),
    )
    .await?;

    Ok(GenerationOutcome {
        stored,
        attempts: generated.attempts,
    })
}

/// Generate a plan for a request that was saved earlier and attach it to
/// that record.
pub async fn generate_for_stored(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    generator: Generator<'_>,
) -> Result<GenerationOutcome, ServiceError> {
    let existing = store::get_plan(pool, user_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(id.to_owned()))?;

    if existing.response_payload.is_some() {
        info!(%id, "regenerating plan that already has a response");
    }

    let generated =
        generate_plan(generator.model, generator.budget, &existing.request_payload).await?;
    let artifact_path = export_artifact(&generated.plan, generator.artifact_dir, &generated.artifact_id);

    // The record can vanish while the model is working.
    let stored = store::attach_plan(pool, user_id, id, &generated.plan, artifact_path.as_deref())
        .await?
        .ok_or_else(|| ServiceError::NotFound(id.to_owned()))?;

    Ok(GenerationOutcome {
        stored,
        attempts: generated.attempts,
    })
}

/// Export and return the path as a string, or log and return `None`.
fn export_artifact(plan: &WorkoutPlan, artifact_dir: &Path, artifact_id: &str) -> Option<String> {
    match export_plan(plan, artifact_dir, artifact_id) {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(e) => {
            warn!(error = %e, %artifact_id, "plan export failed; saving without artifact");
            None
        }
    }
}
