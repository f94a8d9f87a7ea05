//! Prompt construction for plan generation.
//!
//! Pure string assembly: the base prompt restates every intake field and
//! the structural directives, and the retry prompt appends the previous
//! attempt's discrepancies.

use crate::llm::StructuredPrompt;
use crate::workout::WorkoutRequest;

use super::schema::{PLAN_SCHEMA_NAME, plan_json_schema};

/// Role given to the model on every attempt.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an elite strength and wellness coach generating periodized training plans.";

const RETRY_HEADER: &str = "Previous attempt failed validation:";

const RETRY_INSTRUCTION: &str = "Regenerate the entire plan so every week count, week numbering, \
and session totals match the constraints exactly. The next draft must be fully compliant.";

/// Build the first-attempt prompt for `request`.
pub fn build_base_prompt(request: &WorkoutRequest) -> String {
    let weeks = request.cycle_length_weeks;
    let frequency = request.training_frequency;
    let focus = request.training_focus;
    let injuries = request
        .injuries
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("None");
    let stats = request
        .powerlifting_stats
        .as_ref()
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::to_string(s).ok())
        .unwrap_or_else(|| "N/A".to_owned());

    format!(
        "Generate a structured workout program in JSON format.
User context:
- Program Type: {program_type}
- Cycle Length: {weeks} weeks (MUST generate exactly {weeks} weeks)
- Training Focus: {focus}
- Session Length: {session} minutes
- Goals: {goals}
- Equipment: {equipment}
- Training Frequency: {frequency} sessions/week (MUST schedule exactly {frequency} sessions in EVERY week)
- Injuries: {injuries}
- Experience: {experience}
- Start Date: {start}
- Powerlifting Stats: {stats}

Design an elite-level multi-week training plan that aligns with evidence-based methodologies for {focus} athletes. Follow these guardrails:
- Set cycleLengthWeeks to exactly {weeks}.
- Generate exactly {weeks} week objects in the weeks array, numbered 1 through {weeks}.
- Each week MUST contain exactly {frequency} session objects in its sessions array.
- Periodize volume and intensity across phases (accumulation, intensification, realization/deload as appropriate).
- Keep sessionMinutes close to {session} without exceeding it significantly.
- Provide main lift prescriptions with sets x reps, precise intensity targets (RPE or %1RM), and note tempo when useful.
- Integrate accessory work, conditioning, and recovery aligned with the athlete's goals, equipment, injuries, and experience level.
- Include readiness monitoring, nutrition priorities, and coaching notes rooted in elite coaching frameworks (e.g., managing MRV, using RPE, monitoring HRV/sleep).
- Reference the elite methodology briefs (advanced periodization playbooks, assessment ladders, neuro-readiness protocols) to justify structure and progression choices.
- Ensure phases and weeks align (weeks must cover the entire cycleLengthWeeks window and respect deload timing). Compute an end date consistent with cycle length.
- When a field expects an array but you have no data, respond with an empty array instead of omitting the field.
- Always include the deloadWeek field for each phase; use null when that phase does not include a deload.
- Every main lift entry must include a tempo field; use null if no tempo cue is required.
- Every main lift entry must include a notes field; use null when no coaching note is necessary.
- Accessory and conditioning entries must include a notes field; use null when no note applies.
- For every session, include readinessCues, accessoryWork, conditioning, and recovery arrays; use [] when nothing applies.
- Keep terminology professional and concise so it can be rendered directly in the UI.",
        program_type = request.program_type,
        session = request.session_length_minutes,
        goals = request.goals,
        equipment = request.equipment,
        experience = request.experience_level,
        start = request.start_date,
    )
}

/// Append itemized feedback from a failed attempt to the base prompt.
pub fn build_retry_prompt(base_prompt: &str, issues: &[String]) -> String {
    let feedback = issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{base_prompt}\n\n{RETRY_HEADER}\n{feedback}\n\n{RETRY_INSTRUCTION}")
}

/// Wrap a user prompt with the system instruction and the plan schema.
pub fn structured_prompt(user_prompt: String) -> StructuredPrompt {
    StructuredPrompt {
        system: SYSTEM_INSTRUCTION.to_owned(),
        user: user_prompt,
        schema_name: PLAN_SCHEMA_NAME.to_owned(),
        schema: plan_json_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::PowerliftingStats;

    fn request() -> WorkoutRequest {
        serde_json::from_value(neuraladapt_test_utils::sample_request_json("Meet Prep")).unwrap()
    }

    #[test]
    fn base_prompt_states_structural_directives() {
        let prompt = build_base_prompt(&request());
        assert!(prompt.contains("MUST generate exactly 8 weeks"));
        assert!(prompt.contains("numbered 1 through 8"));
        assert!(prompt.contains("MUST schedule exactly 4 sessions in EVERY week"));
        assert!(prompt.contains("Each week MUST contain exactly 4 session objects"));
        assert!(prompt.contains("Keep sessionMinutes close to 75"));
    }

    #[test]
    fn base_prompt_embeds_every_intake_field() {
        let prompt = build_base_prompt(&request());
        for needle in [
            "Program Type: Mesocycle",
            "Training Focus: Powerlifting",
            "Session Length: 75 minutes",
            "Goals: Add 20kg to total",
            "Equipment: Barbell, rack, bench",
            "Experience: Intermediate",
            "Start Date: 2025-01-06",
            "methodologies for Powerlifting athletes",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn absent_optionals_render_placeholders() {
        let prompt = build_base_prompt(&request());
        assert!(prompt.contains("- Injuries: None\n"));
        assert!(prompt.contains("- Powerlifting Stats: N/A\n"));
    }

    #[test]
    fn powerlifting_stats_rendered_as_json() {
        let mut req = request();
        req.injuries = Some("Left shoulder impingement".into());
        req.powerlifting_stats = Some(PowerliftingStats {
            squat_max: Some("180kg".into()),
            bench_max: None,
            deadlift_max: Some("220kg".into()),
        });
        let prompt = build_base_prompt(&req);
        assert!(prompt.contains("- Injuries: Left shoulder impingement"));
        assert!(prompt.contains(r#"- Powerlifting Stats: {"squatMax":"180kg","deadliftMax":"220kg"}"#));
    }

    #[test]
    fn retry_prompt_itemizes_feedback() {
        let base = "BASE";
        let issues = vec![
            "Generated 7 weeks instead of 8.".to_owned(),
            "Missing week number 8 in weeks array.".to_owned(),
        ];
        let retry = build_retry_prompt(base, &issues);
        assert!(retry.starts_with("BASE\n\nPrevious attempt failed validation:\n"));
        assert!(retry.contains(
            "- Generated 7 weeks instead of 8.\n- Missing week number 8 in weeks array."
        ));
        assert!(retry.ends_with("The next draft must be fully compliant."));
    }

    #[test]
    fn structured_prompt_uses_named_schema() {
        let prompt = structured_prompt("hi".into());
        assert_eq!(prompt.schema_name, "elite_workout_plan_schema");
        assert_eq!(prompt.system, SYSTEM_INSTRUCTION);
        assert_eq!(prompt.schema["type"], "object");
    }
}
