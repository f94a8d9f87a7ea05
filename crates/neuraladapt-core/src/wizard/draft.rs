use std::collections::BTreeMap;
use std::fmt;

use chrono::Local;

use crate::workout::{PowerliftingStats, ProgramType, TrainingFocus, WorkoutRequest};

/// Every input the intake wizard can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    ProgramName,
    TrainingFocus,
    ProgramType,
    CycleLengthWeeks,
    TrainingFrequency,
    SessionLengthMinutes,
    ExperienceLevel,
    Equipment,
    Goals,
    Injuries,
    SquatMax,
    BenchMax,
    DeadliftMax,
}

impl FieldKey {
    /// The camelCase name used in stored requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProgramName => "programName",
            Self::TrainingFocus => "trainingFocus",
            Self::ProgramType => "programType",
            Self::CycleLengthWeeks => "cycleLengthWeeks",
            Self::TrainingFrequency => "trainingFrequency",
            Self::SessionLengthMinutes => "sessionLengthMinutes",
            Self::ExperienceLevel => "experienceLevel",
            Self::Equipment => "equipment",
            Self::Goals => "goals",
            Self::Injuries => "injuries",
            Self::SquatMax => "squatMax",
            Self::BenchMax => "benchMax",
            Self::DeadliftMax => "deadliftMax",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The intake as filled in so far.
///
/// Raw text goes in through [`WorkoutDraft::set`]; step validation parses
/// it into the typed fields, which [`WorkoutDraft::compose`] turns into a
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutDraft {
    inputs: BTreeMap<FieldKey, String>,
    pub program_name: Option<String>,
    pub training_focus: Option<TrainingFocus>,
    pub program_type: Option<ProgramType>,
    pub cycle_length_weeks: Option<u32>,
    pub session_length_minutes: Option<u32>,
    pub experience_level: Option<String>,
    pub start_date: Option<String>,
    pub goals: Option<String>,
    pub injuries: Option<String>,
    pub equipment: Option<String>,
    pub training_frequency: Option<u32>,
    pub powerlifting_stats: Option<PowerliftingStats>,
}

impl Default for WorkoutDraft {
    fn default() -> Self {
        Self {
            inputs: BTreeMap::new(),
            program_name: None,
            training_focus: Some(TrainingFocus::GeneralFitness),
            program_type: None,
            cycle_length_weeks: None,
            session_length_minutes: None,
            experience_level: None,
            start_date: Some(today()),
            goals: None,
            injuries: None,
            equipment: None,
            training_frequency: None,
            powerlifting_stats: None,
        }
    }
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record raw input for a field. Blank input clears it.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.inputs.remove(&key);
        } else {
            self.inputs.insert(key, value.trim().to_owned());
        }
    }

    /// Raw input for a field, if any.
    pub fn input(&self, key: FieldKey) -> Option<&str> {
        self.inputs.get(&key).map(String::as_str)
    }

    /// Build the request, filling anything still missing with defaults.
    pub fn compose(&self) -> WorkoutRequest {
        WorkoutRequest {
            program_name: self
                .program_name
                .clone()
                .unwrap_or_else(|| "Untitled Program".to_owned()),
            training_focus: self.training_focus.unwrap_or_default(),
            program_type: self.program_type.unwrap_or(ProgramType::Mesocycle),
            cycle_length_weeks: self.cycle_length_weeks.unwrap_or(8),
            session_length_minutes: self.session_length_minutes.unwrap_or(60),
            experience_level: self
                .experience_level
                .clone()
                .unwrap_or_else(|| "Intermediate".to_owned()),
            start_date: self.start_date.clone().unwrap_or_else(today),
            goals: self.goals.clone().unwrap_or_default(),
            injuries: self.injuries.clone(),
            equipment: self.equipment.clone().unwrap_or_default(),
            training_frequency: self.training_frequency.unwrap_or(3),
            powerlifting_stats: self.powerlifting_stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_composes_defaults() {
        let request = WorkoutDraft::new().compose();
        assert_eq!(request.program_name, "Untitled Program");
        assert_eq!(request.training_focus, TrainingFocus::GeneralFitness);
        assert_eq!(request.program_type, ProgramType::Mesocycle);
        assert_eq!(request.cycle_length_weeks, 8);
        assert_eq!(request.session_length_minutes, 60);
        assert_eq!(request.experience_level, "Intermediate");
        assert_eq!(request.training_frequency, 3);
        assert_eq!(request.goals, "");
        assert_eq!(request.equipment, "");
        assert_eq!(request.start_date.len(), 10);
        assert!(request.injuries.is_none());
    }

    #[test]
    fn set_trims_and_blank_clears() {
        let mut draft = WorkoutDraft::new();
        draft.set(FieldKey::Goals, "  get strong ");
        assert_eq!(draft.input(FieldKey::Goals), Some("get strong"));
        draft.set(FieldKey::Goals, "   ");
        assert_eq!(draft.input(FieldKey::Goals), None);
    }
}
