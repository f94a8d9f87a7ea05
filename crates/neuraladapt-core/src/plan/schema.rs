//! The strict JSON schema a generated plan must satisfy, and the parser
//! that enforces it.

use serde_json::{Value, json};
use thiserror::Error;

use crate::workout::WorkoutPlan;

/// Name the schema is registered under in the structured-output request.
pub const PLAN_SCHEMA_NAME: &str = "elite_workout_plan_schema";

/// A model response that is not a usable plan. Never retried.
#[derive(Debug, Error)]
pub enum PlanSchemaError {
    #[error("generated plan is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("generated plan does not match the schema:\n  {}", .0.join("\n  "))]
    SchemaViolation(Vec<String>),

    #[error("generated plan could not be read: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("generated plan violates plan constraints:\n  {}", .0.join("\n  "))]
    Constraint(Vec<String>),

    #[error("plan schema failed to compile: {0}")]
    SchemaCompile(String),
}

/// Parse raw model output into a [`WorkoutPlan`].
///
/// Runs, in order: JSON parsing, schema validation, typed
/// deserialization, then [`WorkoutPlan::constraint_violations`].
pub fn parse_plan(raw: &str) -> Result<WorkoutPlan, PlanSchemaError> {
    let value: Value = serde_json::from_str(raw).map_err(PlanSchemaError::InvalidJson)?;
    validate_plan_value(&value)?;

    let plan: WorkoutPlan = serde_json::from_value(value).map_err(PlanSchemaError::Malformed)?;
    let violations = plan.constraint_violations();
    if !violations.is_empty() {
        return Err(PlanSchemaError::Constraint(violations));
    }
    Ok(plan)
}

/// Validate an already-parsed value against [`plan_json_schema`].
pub fn validate_plan_value(value: &Value) -> Result<(), PlanSchemaError> {
    let schema = plan_json_schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| PlanSchemaError::SchemaCompile(e.to_string()))?;

    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PlanSchemaError::SchemaViolation(errors))
    }
}

fn string_list(min_items: Option<u64>) -> Value {
    match min_items {
        Some(n) => json!({ "type": "array", "items": { "type": "string" }, "minItems": n }),
        None => json!({ "type": "array", "items": { "type": "string" } }),
    }
}

fn string_or_integer() -> Value {
    json!({ "anyOf": [{ "type": "string" }, { "type": "integer" }] })
}

/// The strict response schema. Every object closes over its properties
/// and lists all of them as required; optional values are nullable.
pub fn plan_json_schema() -> Value {
    let main_lift = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "name": { "type": "string" },
            "sets": { "type": "integer" },
            "reps": string_or_integer(),
            "intensity": { "type": "string" },
            "rest": string_or_integer(),
            "tempo": { "type": ["string", "null"] },
            "notes": { "type": ["string", "null"] }
        },
        "required": ["name", "sets", "reps", "intensity", "rest", "tempo", "notes"]
    });

    let accessory = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "name": { "type": "string" },
            "sets": { "type": "integer" },
            "reps": string_or_integer(),
            "notes": { "type": ["string", "null"] }
        },
        "required": ["name", "sets", "reps", "notes"]
    });

    let conditioning = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "modality": { "type": "string" },
            "durationMinutes": { "type": "integer" },
            "notes": { "type": ["string", "null"] }
        },
        "required": ["modality", "durationMinutes", "notes"]
    });

    let session = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "day": { "type": "string" },
            "emphasis": { "type": "string" },
            "sessionMinutes": { "type": "integer", "minimum": 1 },
            "readinessCues": string_list(None),
            "mainLifts": { "type": "array", "minItems": 1, "items": main_lift },
            "accessoryWork": { "type": "array", "items": accessory },
            "conditioning": { "type": "array", "items": conditioning },
            "recovery": string_list(None)
        },
        "required": [
            "day", "emphasis", "sessionMinutes", "readinessCues",
            "mainLifts", "accessoryWork", "conditioning", "recovery"
        ]
    });

    let week = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "week": { "type": "integer", "minimum": 1 },
            "focus": { "type": "string" },
            "keyOutcomes": string_list(Some(1)),
            "sessions": { "type": "array", "minItems": 1, "items": session }
        },
        "required": ["week", "focus", "keyOutcomes", "sessions"]
    });

    let phase = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "name": { "type": "string" },
            "startWeek": { "type": "integer", "minimum": 1 },
            "endWeek": { "type": "integer", "minimum": 1 },
            "objectives": string_list(Some(1)),
            "keyMetrics": string_list(Some(1)),
            "deloadWeek": { "type": ["integer", "null"] }
        },
        "required": ["name", "startWeek", "endWeek", "objectives", "keyMetrics", "deloadWeek"]
    });

    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "programName": { "type": "string" },
            "trainingFocus": { "type": "string" },
            "programType": { "type": "string" },
            "cycleLengthWeeks": { "type": "integer", "minimum": 1 },
            "startDate": { "type": "string" },
            "endDate": { "type": "string" },
            "athleteProfile": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "summary": { "type": "string" },
                    "primaryGoals": string_list(Some(1)),
                    "constraints": string_list(None)
                },
                "required": ["summary", "primaryGoals", "constraints"]
            },
            "methodology": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "periodizationModel": { "type": "string" },
                    "volumeStrategy": { "type": "string" },
                    "intensityStrategy": { "type": "string" },
                    "frequencyStrategy": { "type": "string" }
                },
                "required": [
                    "periodizationModel", "volumeStrategy",
                    "intensityStrategy", "frequencyStrategy"
                ]
            },
            "phases": { "type": "array", "minItems": 1, "items": phase },
            "weeks": { "type": "array", "minItems": 1, "items": week },
            "monitoring": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "readinessChecks": string_list(Some(1)),
                    "nutritionFocus": string_list(Some(1)),
                    "recoveryProtocols": string_list(Some(1))
                },
                "required": ["readinessChecks", "nutritionFocus", "recoveryProtocols"]
            },
            "coachingNotes": string_list(Some(1))
        },
        "required": [
            "programName", "trainingFocus", "programType", "cycleLengthWeeks",
            "startDate", "endDate", "athleteProfile", "methodology",
            "phases", "weeks", "monitoring", "coachingNotes"
        ]
    })
}
