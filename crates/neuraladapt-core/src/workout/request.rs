use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest cycle a request may ask for.
pub const MAX_CYCLE_WEEKS: u32 = 52;
/// Most sessions a week may hold.
pub const MAX_TRAINING_FREQUENCY: u32 = 7;
/// Upper bound on a single session, in minutes.
pub const MAX_SESSION_MINUTES: u32 = 600;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Sport emphasis of a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingFocus {
    #[default]
    #[serde(rename = "General Fitness")]
    GeneralFitness,
    Powerlifting,
    Bodybuilding,
}

impl TrainingFocus {
    pub const ALL: [TrainingFocus; 3] =
        [Self::GeneralFitness, Self::Powerlifting, Self::Bodybuilding];

    pub fn label(&self) -> &'static str {
        match self {
            Self::GeneralFitness => "General Fitness",
            Self::Powerlifting => "Powerlifting",
            Self::Bodybuilding => "Bodybuilding",
        }
    }
}

impl fmt::Display for TrainingFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrainingFocus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "general fitness" | "general" => Ok(Self::GeneralFitness),
            "powerlifting" => Ok(Self::Powerlifting),
            "bodybuilding" => Ok(Self::Bodybuilding),
            _ => Err(format!(
                "invalid training focus: {s:?} (expected General Fitness, Powerlifting, or Bodybuilding)"
            )),
        }
    }
}

/// Length class of a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramType {
    Microcycle,
    #[default]
    Mesocycle,
    Macrocycle,
    Block,
}

impl ProgramType {
    pub const ALL: [ProgramType; 4] =
        [Self::Microcycle, Self::Mesocycle, Self::Macrocycle, Self::Block];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Microcycle => "Microcycle",
            Self::Mesocycle => "Mesocycle",
            Self::Macrocycle => "Macrocycle",
            Self::Block => "Block",
        }
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProgramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microcycle" => Ok(Self::Microcycle),
            "mesocycle" => Ok(Self::Mesocycle),
            "macrocycle" => Ok(Self::Macrocycle),
            "block" => Ok(Self::Block),
            _ => Err(format!(
                "invalid program type: {s:?} (expected Microcycle, Mesocycle, Macrocycle, or Block)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Optional one-rep maxes, kept as free text ("180kg", "405 lb").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerliftingStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squat_max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench_max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlift_max: Option<String>,
}

impl PowerliftingStats {
    pub fn is_empty(&self) -> bool {
        self.squat_max.is_none() && self.bench_max.is_none() && self.deadlift_max.is_none()
    }
}

/// Intake describing the program a user wants generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
    pub program_name: String,
    #[serde(default)]
    pub training_focus: TrainingFocus,
    pub program_type: ProgramType,
    pub cycle_length_weeks: u32,
    pub session_length_minutes: u32,
    pub experience_level: String,
    pub start_date: String,
    pub goals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<String>,
    pub equipment: String,
    pub training_frequency: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powerlifting_stats: Option<PowerliftingStats>,
}

/// A request rejected before any model call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Check that required text is present and every number is in range.
pub fn validate_request(request: &WorkoutRequest) -> Result<(), RequestValidationError> {
    let required = [
        ("programName", &request.program_name),
        ("experienceLevel", &request.experience_level),
        ("startDate", &request.start_date),
        ("goals", &request.goals),
        ("equipment", &request.equipment),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(RequestValidationError::Blank { field });
        }
    }

    let ranges = [
        ("cycleLengthWeeks", request.cycle_length_weeks, MAX_CYCLE_WEEKS),
        ("trainingFrequency", request.training_frequency, MAX_TRAINING_FREQUENCY),
        ("sessionLengthMinutes", request.session_length_minutes, MAX_SESSION_MINUTES),
    ];
    for (field, value, max) in ranges {
        if !(1..=max).contains(&value) {
            return Err(RequestValidationError::OutOfRange {
                field,
                value,
                min: 1,
                max,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> WorkoutRequest {
        serde_json::from_value(neuraladapt_test_utils::sample_request_json("Meet Prep")).unwrap()
    }

    #[test]
    fn sample_request_is_valid() {
        let req = request();
        assert_eq!(req.training_focus, TrainingFocus::Powerlifting);
        assert_eq!(req.program_type, ProgramType::Mesocycle);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn focus_defaults_to_general_fitness() {
        let mut value = neuraladapt_test_utils::sample_request_json("x");
        value.as_object_mut().unwrap().remove("trainingFocus");
        let req: WorkoutRequest = serde_json::from_value(value).unwrap();
        assert_eq!(req.training_focus, TrainingFocus::GeneralFitness);
    }

    #[test]
    fn focus_serializes_with_space() {
        let json = serde_json::to_value(TrainingFocus::GeneralFitness).unwrap();
        assert_eq!(json, "General Fitness");
        assert_eq!(
            "general-fitness".parse::<TrainingFocus>().unwrap(),
            TrainingFocus::GeneralFitness
        );
    }

    #[test]
    fn program_type_parse() {
        assert_eq!("block".parse::<ProgramType>().unwrap(), ProgramType::Block);
        assert!("weekly".parse::<ProgramType>().is_err());
    }

    #[test]
    fn optional_fields_omitted_when_absent() {
        let json = serde_json::to_value(request()).unwrap();
        assert!(json.get("injuries").is_none());
        assert!(json.get("powerliftingStats").is_none());
    }

    #[test]
    fn blank_goals_rejected() {
        let mut req = request();
        req.goals = "   ".into();
        assert_eq!(
            validate_request(&req),
            Err(RequestValidationError::Blank { field: "goals" })
        );
    }

    #[test]
    fn zero_frequency_rejected() {
        let mut req = request();
        req.training_frequency = 0;
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(
            err,
            RequestValidationError::OutOfRange { field: "trainingFrequency", value: 0, .. }
        ));
    }

    #[test]
    fn cycle_bounds() {
        let mut req = request();
        req.cycle_length_weeks = 52;
        assert!(validate_request(&req).is_ok());
        req.cycle_length_weeks = 53;
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn frequency_above_seven_rejected() {
        let mut req = request();
        req.training_frequency = 8;
        assert!(validate_request(&req).is_err());
    }
}
