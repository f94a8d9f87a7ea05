//! The three intake steps.

use async_trait::async_trait;

use crate::workout::{PowerliftingStats, ProgramType, TrainingFocus};

use super::draft::{FieldKey, WorkoutDraft};
use super::{FieldKind, FieldSpec, StepOutcome, WizardError, WizardStep};

const FOCUS_OPTIONS: &[&str] = &["General Fitness", "Powerlifting", "Bodybuilding"];
const TYPE_OPTIONS: &[&str] = &["Microcycle", "Mesocycle", "Macrocycle", "Block"];

/// The intake steps in order.
pub fn intake_steps() -> Vec<Box<dyn WizardStep>> {
    vec![
        Box::new(BasicInfoStep),
        Box::new(TrainingDetailsStep),
        Box::new(GoalsStep),
    ]
}

/// Parse a bounded whole number, or explain why not.
fn parse_bounded(
    draft: &WorkoutDraft,
    key: FieldKey,
    min: u32,
    max: u32,
    required: &str,
    too_small: &str,
    unit: &str,
) -> Result<u32, String> {
    let raw = draft.input(key).ok_or_else(|| required.to_owned())?;
    let value: i64 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a whole number"))?;
    if value < i64::from(min) {
        return Err(too_small.to_owned());
    }
    if value > i64::from(max) {
        return Err(format!("Must be at most {max} {unit}"));
    }
    // Bounded by `max` above.
    Ok(value as u32)
}

fn required_text(draft: &WorkoutDraft, key: FieldKey, message: &str) -> Result<String, String> {
    draft
        .input(key)
        .map(str::to_owned)
        .ok_or_else(|| message.to_owned())
}

fn optional_text(draft: &WorkoutDraft, key: FieldKey) -> Option<String> {
    draft.input(key).map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Step 1
// ---------------------------------------------------------------------------

pub struct BasicInfoStep;

#[async_trait]
impl WizardStep for BasicInfoStep {
    fn id(&self) -> &str {
        "basic"
    }

    fn title(&self) -> &str {
        "Basic Information"
    }

    fn description(&self) -> &str {
        "Set up the foundation of your workout program"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(FieldKey::ProgramName, "Program Name", FieldKind::Text).required(),
            FieldSpec::new(
                FieldKey::TrainingFocus,
                "Training Focus",
                FieldKind::Select(FOCUS_OPTIONS),
            )
            .placeholder("General Fitness"),
            FieldSpec::new(
                FieldKey::ProgramType,
                "Program Type",
                FieldKind::Select(TYPE_OPTIONS),
            )
            .required(),
            FieldSpec::new(
                FieldKey::CycleLengthWeeks,
                "Cycle Length",
                FieldKind::Number {
                    min: 1,
                    max: 52,
                    suffix: "weeks",
                },
            )
            .required(),
        ]
    }

    async fn validate(&self, draft: &mut WorkoutDraft) -> Result<StepOutcome, WizardError> {
        let checked = (|| {
            let name = required_text(draft, FieldKey::ProgramName, "Program name is required")?;
            // Focus keeps its default when left blank.
            let focus = match draft.input(FieldKey::TrainingFocus) {
                Some(raw) => raw.parse::<TrainingFocus>()?,
                None => draft.training_focus.unwrap_or_default(),
            };
            let program_type = draft
                .input(FieldKey::ProgramType)
                .ok_or_else(|| "Program type is required".to_owned())?
                .parse::<ProgramType>()?;
            let weeks = parse_bounded(
                draft,
                FieldKey::CycleLengthWeeks,
                1,
                52,
                "Cycle length is required",
                "Must be at least 1 week",
                "weeks",
            )?;
            Ok::<_, String>((name, focus, program_type, weeks))
        })();

        Ok(match checked {
            Ok((name, focus, program_type, weeks)) => {
                draft.program_name = Some(name);
                draft.training_focus = Some(focus);
                draft.program_type = Some(program_type);
                draft.cycle_length_weeks = Some(weeks);
                StepOutcome::Pass
            }
            Err(message) => StepOutcome::Fail(message),
        })
    }
}

// ---------------------------------------------------------------------------
// Step 2
// ---------------------------------------------------------------------------

pub struct TrainingDetailsStep;

#[async_trait]
impl WizardStep for TrainingDetailsStep {
    fn id(&self) -> &str {
        "details"
    }

    fn title(&self) -> &str {
        "Training Details"
    }

    fn description(&self) -> &str {
        "Configure your training schedule and preferences"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(
                FieldKey::TrainingFrequency,
                "Training Frequency",
                FieldKind::Number {
                    min: 1,
                    max: 7,
                    suffix: "sessions/week",
                },
            )
            .required(),
            FieldSpec::new(
                FieldKey::SessionLengthMinutes,
                "Session Length",
                FieldKind::Number {
                    min: 15,
                    max: 180,
                    suffix: "minutes",
                },
            )
            .required(),
            FieldSpec::new(FieldKey::ExperienceLevel, "Experience Level", FieldKind::Text)
                .placeholder("e.g., Beginner, Intermediate, Advanced"),
            FieldSpec::new(FieldKey::Equipment, "Available Equipment", FieldKind::TextArea)
                .required()
                .placeholder("List the equipment you have access to..."),
        ]
    }

    async fn validate(&self, draft: &mut WorkoutDraft) -> Result<StepOutcome, WizardError> {
        let checked = (|| {
            let frequency = parse_bounded(
                draft,
                FieldKey::TrainingFrequency,
                1,
                7,
                "Training frequency is required",
                "Must be at least 1 session per week",
                "sessions per week",
            )?;
            let minutes = parse_bounded(
                draft,
                FieldKey::SessionLengthMinutes,
                15,
                180,
                "Session length is required",
                "Must be at least 15 minutes",
                "minutes",
            )?;
            let equipment = required_text(
                draft,
                FieldKey::Equipment,
                "Equipment information is required",
            )?;
            Ok::<_, String>((frequency, minutes, equipment))
        })();

        Ok(match checked {
            Ok((frequency, minutes, equipment)) => {
                draft.training_frequency = Some(frequency);
                draft.session_length_minutes = Some(minutes);
                draft.experience_level = optional_text(draft, FieldKey::ExperienceLevel);
                draft.equipment = Some(equipment);
                StepOutcome::Pass
            }
            Err(message) => StepOutcome::Fail(message),
        })
    }
}

// ---------------------------------------------------------------------------
// Step 3
// ---------------------------------------------------------------------------

pub struct GoalsStep;

#[async_trait]
impl WizardStep for GoalsStep {
    fn id(&self) -> &str {
        "goals"
    }

    fn title(&self) -> &str {
        "Goals & Constraints"
    }

    fn description(&self) -> &str {
        "Tell us about your fitness goals and any limitations"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(FieldKey::Goals, "Training Goals", FieldKind::TextArea)
                .required()
                .placeholder("What do you want to achieve with this program?"),
            FieldSpec::new(
                FieldKey::Injuries,
                "Injuries or Limitations (Optional)",
                FieldKind::TextArea,
            )
            .placeholder("Any injuries or physical limitations to consider..."),
            FieldSpec::new(FieldKey::SquatMax, "Squat Max (Optional)", FieldKind::Text)
                .placeholder("e.g., 180kg"),
            FieldSpec::new(FieldKey::BenchMax, "Bench Max (Optional)", FieldKind::Text)
                .placeholder("e.g., 120kg"),
            FieldSpec::new(FieldKey::DeadliftMax, "Deadlift Max (Optional)", FieldKind::Text)
                .placeholder("e.g., 220kg"),
        ]
    }

    async fn validate(&self, draft: &mut WorkoutDraft) -> Result<StepOutcome, WizardError> {
        let goals = match required_text(draft, FieldKey::Goals, "Training goals are required") {
            Ok(goals) => goals,
            Err(message) => return Ok(StepOutcome::Fail(message)),
        };

        let stats = PowerliftingStats {
            squat_max: optional_text(draft, FieldKey::SquatMax),
            bench_max: optional_text(draft, FieldKey::BenchMax),
            deadlift_max: optional_text(draft, FieldKey::DeadliftMax),
        };

        draft.goals = Some(goals);
        draft.injuries = optional_text(draft, FieldKey::Injuries);
        draft.powerlifting_stats = (!stats.is_empty()).then_some(stats);
        Ok(StepOutcome::Pass)
    }
}
