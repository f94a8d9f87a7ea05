//! Typed access to stored plans.
//!
//! The database layer keeps payloads as opaque JSON; this module converts
//! them to and from [`WorkoutRequest`] and [`WorkoutPlan`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use neuraladapt_db::models::{NewWorkoutPlan, WorkoutPlanRecord};
use neuraladapt_db::queries::workout_plans as plan_db;

use crate::workout::{WorkoutPlan, WorkoutRequest};

/// A saved request, optionally with its generated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkoutPlan {
    pub id: String,
    pub user_id: String,
    pub program_name: String,
    pub request_payload: WorkoutRequest,
    pub response_payload: Option<WorkoutPlan>,
    pub artifact_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WorkoutPlanRecord> for StoredWorkoutPlan {
    type Error = anyhow::Error;

    fn try_from(record: WorkoutPlanRecord) -> Result<Self> {
        let request_payload = serde_json::from_value(record.request_payload)
            .with_context(|| format!("stored request for plan {} is unreadable", record.id))?;
        let response_payload = record
            .response_payload
            .map(serde_json::from_value)
            .transpose()
            .with_context(|| format!("stored response for plan {} is unreadable", record.id))?;

        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            program_name: record.program_name,
            request_payload,
            response_payload,
            artifact_path: record.artifact_path,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Persist a request, with its plan and artifact path when available.
pub async fn save_plan(
    pool: &SqlitePool,
    user_id: &str,
    request: &WorkoutRequest,
    plan: Option<&WorkoutPlan>,
    artifact_path: Option<&str>,
) -> Result<StoredWorkoutPlan> {
    let request_payload =
        serde_json::to_value(request).context("failed to serialize workout request")?;
    let response_payload = plan
        .map(serde_json::to_value)
        .transpose()
        .context("failed to serialize workout plan")?;

    // A generated plan's own name wins over the intake's.
    let program_name = plan
        .map(|p| p.program_name.as_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&request.program_name);

    let record = plan_db::insert_workout_plan(
        pool,
        &NewWorkoutPlan {
            user_id,
            program_name,
            request_payload: &request_payload,
            response_payload: response_payload.as_ref(),
            artifact_path,
        },
    )
    .await?;

    info!(id = %record.id, program = %record.program_name, generated = plan.is_some(), "saved workout plan");
    record.try_into()
}

/// Persist a request without generating anything.
pub async fn save_request(
    pool: &SqlitePool,
    user_id: &str,
    request: &WorkoutRequest,
) -> Result<StoredWorkoutPlan> {
    save_plan(pool, user_id, request, None, None).await
}

pub async fn get_plan(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<StoredWorkoutPlan>> {
    plan_db::get_workout_plan(pool, user_id, id)
        .await?
        .map(StoredWorkoutPlan::try_from)
        .transpose()
}

/// All of a user's plans, newest first.
pub async fn list_plans(pool: &SqlitePool, user_id: &str) -> Result<Vec<StoredWorkoutPlan>> {
    plan_db::list_workout_plans(pool, user_id)
        .await?
        .into_iter()
        .map(StoredWorkoutPlan::try_from)
        .collect()
}

/// Returns whether a plan was removed.
pub async fn delete_plan(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let removed = plan_db::delete_workout_plan(pool, user_id, id).await?;
    if removed {
        info!(%id, "deleted workout plan");
    }
    Ok(removed)
}

/// Attach a generated plan to a stored request. `None` if the request is
/// not found for this user.
pub async fn attach_plan(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    plan: &WorkoutPlan,
    artifact_path: Option<&str>,
) -> Result<Option<StoredWorkoutPlan>> {
    let response = serde_json::to_value(plan).context("failed to serialize workout plan")?;
    plan_db::attach_response(pool, user_id, id, &response, artifact_path)
        .await?
        .map(StoredWorkoutPlan::try_from)
        .transpose()
}

/// Record where a plan's workbook was written. `None` if the plan is not
/// found for this user.
pub async fn set_artifact_path(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    artifact_path: &str,
) -> Result<Option<StoredWorkoutPlan>> {
    let record = plan_db::set_artifact_path(pool, user_id, id, artifact_path).await?;
    if record.is_some() {
        info!(%id, %artifact_path, "recorded plan artifact");
    }
    record.map(StoredWorkoutPlan::try_from).transpose()
}
