//! Database query functions for the `feature_selections` table.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{FeatureSelectionRecord, FeatureSelectionRow, FeatureSelectionUpdate};

/// Fetch a user's feature selections.
///
/// Returns [`FeatureSelectionRecord::default_for`] when nothing has been
/// stored yet; the default is not persisted.
pub async fn get_feature_selections(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<FeatureSelectionRecord> {
    let row = sqlx::query_as::<_, FeatureSelectionRow>(
        "SELECT * FROM feature_selections WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch feature selections")?;

    Ok(row
        .map(Into::into)
        .unwrap_or_else(|| FeatureSelectionRecord::default_for(user_id)))
}

/// Apply a partial update to a user's feature selections.
///
/// Supplied flags are written, unsupplied flags keep their stored values
/// (or the defaults when the row is created by this call). `updated_at`
/// always advances, even for two updates within the same millisecond.
/// An empty update writes nothing and returns the current record.
pub async fn update_feature_selections(
    pool: &SqlitePool,
    user_id: &str,
    update: &FeatureSelectionUpdate,
) -> Result<FeatureSelectionRecord> {
    if update.is_empty() {
        return get_feature_selections(pool, user_id).await;
    }

    let defaults = FeatureSelectionRecord::default_for(user_id);
    let now = Utc::now().timestamp_millis();

    let row = sqlx::query_as::<_, FeatureSelectionRow>(
        "INSERT INTO feature_selections \
         (id, user_id, workout_programmer, journaling, calendar, updated_at) \
         VALUES ($1, $2, COALESCE($3, $4), COALESCE($5, $6), COALESCE($7, $8), $9) \
         ON CONFLICT(user_id) DO UPDATE SET \
             workout_programmer = COALESCE($3, workout_programmer), \
             journaling = COALESCE($5, journaling), \
             calendar = COALESCE($7, calendar), \
             updated_at = MAX($9, feature_selections.updated_at + 1) \
         RETURNING *",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(update.workout_programmer)
    .bind(defaults.workout_programmer)
    .bind(update.journaling)
    .bind(defaults.journaling)
    .bind(update.calendar)
    .bind(defaults.calendar)
    .bind(now)
    .fetch_one(pool)
    .await
    .context("failed to update feature selections")?;

    Ok(row.into())
}
