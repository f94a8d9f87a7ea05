use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;

/// Owner of every record. The app is single-user.
pub const DEFAULT_USER_ID: &str = "demo-user";

/// Convert a stored millisecond timestamp into a UTC datetime.
pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// One of the optional app modules a user can switch on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    WorkoutProgrammer,
    Journaling,
    Calendar,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Self::WorkoutProgrammer, Self::Journaling, Self::Calendar];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WorkoutProgrammer => "workout_programmer",
            Self::Journaling => "journaling",
            Self::Calendar => "calendar",
        };
        f.write_str(s)
    }
}

impl FromStr for Feature {
    type Err = FeatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workout_programmer" | "workoutProgrammer" | "workout-programmer" => {
                Ok(Self::WorkoutProgrammer)
            }
            "journaling" => Ok(Self::Journaling),
            "calendar" => Ok(Self::Calendar),
            other => Err(FeatureParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Feature`] string.
#[derive(Debug, Clone)]
pub struct FeatureParseError(pub String);

impl fmt::Display for FeatureParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid feature: {:?} (expected workout_programmer, journaling, or calendar)",
            self.0
        )
    }
}

impl std::error::Error for FeatureParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// Raw `workout_plans` row. Timestamps are stored as unix milliseconds.
#[derive(Debug, FromRow)]
pub(crate) struct WorkoutPlanRow {
    pub id: String,
    pub user_id: String,
    pub program_name: String,
    pub request_payload: Json<Value>,
    pub response_payload: Option<Json<Value>>,
    pub artifact_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A stored workout program. Payloads are opaque JSON at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanRecord {
    pub id: String,
    pub user_id: String,
    pub program_name: String,
    pub request_payload: Value,
    pub response_payload: Option<Value>,
    pub artifact_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkoutPlanRow> for WorkoutPlanRecord {
    fn from(row: WorkoutPlanRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            program_name: row.program_name,
            request_payload: row.request_payload.0,
            response_payload: row.response_payload.map(|p| p.0),
            artifact_path: row.artifact_path,
            created_at: from_millis(row.created_at),
            updated_at: from_millis(row.updated_at),
        }
    }
}

/// Insert parameters for a workout plan row.
#[derive(Debug, Clone)]
pub struct NewWorkoutPlan<'a> {
    pub user_id: &'a str,
    pub program_name: &'a str,
    pub request_payload: &'a Value,
    pub response_payload: Option<&'a Value>,
    pub artifact_path: Option<&'a str>,
}

/// Raw `feature_selections` row.
#[derive(Debug, FromRow)]
pub(crate) struct FeatureSelectionRow {
    pub id: String,
    pub user_id: String,
    pub workout_programmer: bool,
    pub journaling: bool,
    pub calendar: bool,
    pub updated_at: i64,
}

/// Per-user module toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSelectionRecord {
    pub id: String,
    pub user_id: String,
    pub workout_programmer: bool,
    pub journaling: bool,
    pub calendar: bool,
    pub updated_at: DateTime<Utc>,
}

impl FeatureSelectionRecord {
    /// Identifier reported for the record before anything has been stored.
    pub const DEFAULT_ID: &str = "default";

    /// The record returned when a user has never saved selections.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: Self::DEFAULT_ID.to_owned(),
            user_id: user_id.to_owned(),
            workout_programmer: true,
            journaling: false,
            calendar: false,
            updated_at: Utc::now(),
        }
    }

    /// Current value of a single toggle.
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::WorkoutProgrammer => self.workout_programmer,
            Feature::Journaling => self.journaling,
            Feature::Calendar => self.calendar,
        }
    }
}

impl From<FeatureSelectionRow> for FeatureSelectionRecord {
    fn from(row: FeatureSelectionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            workout_programmer: row.workout_programmer,
            journaling: row.journaling,
            calendar: row.calendar,
            updated_at: from_millis(row.updated_at),
        }
    }
}

/// Partial update of feature toggles. `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSelectionUpdate {
    #[serde(default)]
    pub workout_programmer: Option<bool>,
    #[serde(default)]
    pub journaling: Option<bool>,
    #[serde(default)]
    pub calendar: Option<bool>,
}

impl FeatureSelectionUpdate {
    /// An update that sets a single feature.
    pub fn set(feature: Feature, enabled: bool) -> Self {
        let mut update = Self::default();
        match feature {
            Feature::WorkoutProgrammer => update.workout_programmer = Some(enabled),
            Feature::Journaling => update.journaling = Some(enabled),
            Feature::Calendar => update.calendar = Some(enabled),
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        self.workout_programmer.is_none() && self.journaling.is_none() && self.calendar.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
