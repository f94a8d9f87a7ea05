//! Shared test utilities for neuraladapt integration tests.
//!
//! Every test gets its own in-memory SQLite database with migrations
//! applied, so tests are isolated without any external service.

use serde_json::{Value, json};
use sqlx::SqlitePool;

use neuraladapt_db::config::DbConfig;
use neuraladapt_db::pool;

/// Create a fresh in-memory database with migrations applied.
///
/// The pool holds a single connection that never expires; the database
/// disappears when the pool is closed or dropped.
pub async fn create_test_db() -> SqlitePool {
    let config = DbConfig::new("sqlite::memory:");
    let pool = pool::create_pool(&config)
        .await
        .expect("failed to open in-memory database");

    pool::run_migrations(&pool)
        .await
        .expect("migrations should succeed");

    pool
}

/// A minimal intake payload as the app stores it (camelCase JSON).
pub fn sample_request_json(program_name: &str) -> Value {
    json!({
        "programName": program_name,
        "trainingFocus": "Powerlifting",
        "programType": "Mesocycle",
        "cycleLengthWeeks": 8,
        "sessionLengthMinutes": 75,
        "experienceLevel": "Intermediate",
        "startDate": "2025-01-06",
        "goals": "Add 20kg to total",
        "equipment": "Barbell, rack, bench",
        "trainingFrequency": 4
    })
}

/// A small response payload; its shape only matters to the store as JSON.
pub fn sample_response_json(program_name: &str) -> Value {
    json!({
        "programName": program_name,
        "cycleLengthWeeks": 8,
        "weeks": [{ "week": 1, "sessions": [] }]
    })
}

/// A complete, schema-valid plan with `weeks` weeks of `sessions_per_week`
/// sessions each, numbered from 1.
///
/// Each session carries one main lift, one accessory, one conditioning
/// block, a recovery item and a readiness cue so every export row kind is
/// exercised.
pub fn sample_plan_json(program_name: &str, weeks: u32, sessions_per_week: u32) -> Value {
    let week_entries: Vec<Value> = (1..=weeks)
        .map(|week| {
            let sessions: Vec<Value> = (1..=sessions_per_week)
                .map(|day| sample_session_json(week, day))
                .collect();
            json!({
                "week": week,
                "focus": format!("Week {week} focus"),
                "keyOutcomes": [format!("Complete week {week}")],
                "sessions": sessions
            })
        })
        .collect();

    json!({
        "programName": program_name,
        "trainingFocus": "Powerlifting",
        "programType": "Mesocycle",
        "cycleLengthWeeks": weeks,
        "startDate": "2025-01-06",
        "endDate": "2025-03-02",
        "athleteProfile": {
            "summary": "Intermediate lifter peaking for a meet",
            "primaryGoals": ["Add 20kg to total"],
            "constraints": []
        },
        "methodology": {
            "periodizationModel": "Block periodization",
            "volumeStrategy": "Accumulate then taper",
            "intensityStrategy": "RPE 7 to 9 progression",
            "frequencyStrategy": "Full body four days"
        },
        "phases": [{
            "name": "Accumulation",
            "startWeek": 1,
            "endWeek": weeks,
            "objectives": ["Build work capacity"],
            "keyMetrics": ["Weekly tonnage"],
            "deloadWeek": null
        }],
        "weeks": week_entries,
        "monitoring": {
            "readinessChecks": ["Morning HRV"],
            "nutritionFocus": ["Protein 2g/kg"],
            "recoveryProtocols": ["8h sleep"]
        },
        "coachingNotes": ["Leave one rep in reserve on top sets"]
    })
}

fn sample_session_json(week: u32, day: u32) -> Value {
    json!({
        "day": format!("Day {day}"),
        "emphasis": "Squat",
        "sessionMinutes": 75,
        "readinessCues": ["Bar speed check"],
        "mainLifts": [{
            "name": "Back Squat",
            "sets": 4,
            "reps": 5,
            "intensity": format!("RPE {}", 6 + week.min(3)),
            "rest": "3 min",
            "tempo": "3-1-1",
            "notes": null
        }],
        "accessoryWork": [{
            "name": "Walking Lunge",
            "sets": 3,
            "reps": "10 each",
            "notes": null
        }],
        "conditioning": [{
            "modality": "Bike",
            "durationMinutes": 10,
            "notes": "Easy pace"
        }],
        "recovery": ["Foam roll quads"]
    })
}
