//! Structural adherence: does a schema-valid plan have the shape the
//! request asked for?

use std::collections::HashSet;

use crate::workout::{WorkoutPlan, WorkoutRequest};

/// List every way `plan` departs from the requested week and session
/// counts. An empty list means the week count matches, the weeks are
/// numbered exactly 1..=N with no repeats, and every week holds the
/// requested number of sessions.
pub fn evaluate_plan_adherence(plan: &WorkoutPlan, request: &WorkoutRequest) -> Vec<String> {
    let expected_weeks = request.cycle_length_weeks;
    let expected_sessions = request.training_frequency;
    let mut issues = Vec::new();

    if plan.cycle_length_weeks != expected_weeks {
        issues.push(format!(
            "cycleLengthWeeks was {} but expected {expected_weeks}.",
            plan.cycle_length_weeks
        ));
    }

    if plan.weeks.len() != expected_weeks as usize {
        issues.push(format!(
            "Generated {} weeks instead of {expected_weeks}.",
            plan.weeks.len()
        ));
    }

    let provided: HashSet<u32> = plan.weeks.iter().map(|w| w.week).collect();
    for number in 1..=expected_weeks {
        if !provided.contains(&number) {
            issues.push(format!("Missing week number {number} in weeks array."));
        }
    }

    let mut seen = HashSet::new();
    for week in &plan.weeks {
        let in_range = (1..=expected_weeks).contains(&week.week);
        if !in_range || !seen.insert(week.week) {
            issues.push(format!("Unexpected week number {} in weeks array.", week.week));
        }
    }

    for week in &plan.weeks {
        if week.sessions.len() != expected_sessions as usize {
            issues.push(format!(
                "Week {} has {} sessions but expected {expected_sessions}.",
                week.week,
                week.sessions.len()
            ));
        }
    }

    issues
}
