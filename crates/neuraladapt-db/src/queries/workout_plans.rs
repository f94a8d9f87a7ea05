//! Database query functions for the `workout_plans` table.
//!
//! Every query is scoped to the owning user: a plan that belongs to someone
//! else behaves exactly like a plan that does not exist.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::models::{NewWorkoutPlan, WorkoutPlanRecord, WorkoutPlanRow};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Generate a plan identifier: `plan-<unix millis>-<9 base36 chars>`.
pub fn generate_plan_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("plan-{}-{suffix}", Utc::now().timestamp_millis())
}

/// Insert a new plan row. Returns the inserted plan with the generated id
/// and timestamps.
pub async fn insert_workout_plan(
    pool: &SqlitePool,
    new: &NewWorkoutPlan<'_>,
) -> Result<WorkoutPlanRecord> {
    let id = generate_plan_id();
    let now = Utc::now().timestamp_millis();

    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "INSERT INTO workout_plans \
         (id, user_id, program_name, request_payload, response_payload, artifact_path, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
         RETURNING *",
    )
    .bind(&id)
    .bind(new.user_id)
    .bind(new.program_name)
    .bind(Json(new.request_payload))
    .bind(new.response_payload.map(Json))
    .bind(new.artifact_path)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("failed to insert workout plan")?;

    Ok(row.into())
}

/// Fetch a plan by its ID, scoped to `user_id`.
pub async fn get_workout_plan(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<Option<WorkoutPlanRecord>> {
    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "SELECT * FROM workout_plans WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch workout plan")?;

    Ok(row.map(Into::into))
}

/// List a user's plans, newest first.
///
/// Rows created within the same millisecond fall back to insertion order.
pub async fn list_workout_plans(pool: &SqlitePool, user_id: &str) -> Result<Vec<WorkoutPlanRecord>> {
    let rows = sqlx::query_as::<_, WorkoutPlanRow>(
        "SELECT * FROM workout_plans WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list workout plans")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Delete a plan. Returns `true` if a row was removed.
///
/// Deleting an unknown or foreign plan is a no-op, not an error.
pub async fn delete_workout_plan(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete workout plan")?;

    Ok(result.rows_affected() > 0)
}

/// Attach a generated plan (and optionally its export artifact) to a stored
/// request. The artifact path is replaced outright, so a failed export
/// clears any workbook left from an earlier plan. `updated_at` always
/// moves forward.
///
/// Returns `None` when the plan does not exist for this user.
pub async fn attach_response(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    response: &Value,
    artifact_path: Option<&str>,
) -> Result<Option<WorkoutPlanRecord>> {
    let now = Utc::now().timestamp_millis();

    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "UPDATE workout_plans \
         SET response_payload = $1, \
             artifact_path = $2, \
             updated_at = MAX($3, updated_at + 1) \
         WHERE id = $4 AND user_id = $5 \
         RETURNING *",
    )
    .bind(Json(response))
    .bind(artifact_path)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to attach response to workout plan")?;

    Ok(row.map(Into::into))
}

/// Record the workbook written for a stored plan.
///
/// Returns `None` when the plan does not exist for this user.
pub async fn set_artifact_path(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    artifact_path: &str,
) -> Result<Option<WorkoutPlanRecord>> {
    let now = Utc::now().timestamp_millis();

    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "UPDATE workout_plans \
         SET artifact_path = $1, \
             updated_at = MAX($2, updated_at + 1) \
         WHERE id = $3 AND user_id = $4 \
         RETURNING *",
    )
    .bind(artifact_path)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to record artifact path")?;

    Ok(row.map(Into::into))
}
