use std::fmt;

use serde::{Deserialize, Serialize};

/// A rep or rest prescription: models answer with either a bare number or
/// free text such as `"8-10"` or `"90s"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prescription {
    Count(i64),
    Text(String),
}

impl fmt::Display for Prescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A generated multi-week program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub program_name: String,
    pub training_focus: String,
    pub program_type: String,
    pub cycle_length_weeks: u32,
    pub start_date: String,
    pub end_date: String,
    pub athlete_profile: AthleteProfile,
    pub methodology: Methodology,
    pub phases: Vec<Phase>,
    pub weeks: Vec<TrainingWeek>,
    pub monitoring: Monitoring,
    pub coaching_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteProfile {
    pub summary: String,
    pub primary_goals: Vec<String>,
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub periodization_model: String,
    pub volume_strategy: String,
    pub intensity_strategy: String,
    pub frequency_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub start_week: u32,
    pub end_week: u32,
    pub objectives: Vec<String>,
    pub key_metrics: Vec<String>,
    #[serde(default)]
    pub deload_week: Option<u32>,
}

/// One numbered week of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingWeek {
    pub week: u32,
    pub focus: String,
    pub key_outcomes: Vec<String>,
    pub sessions: Vec<TrainingSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub day: String,
    pub emphasis: String,
    pub session_minutes: u32,
    #[serde(default)]
    pub readiness_cues: Vec<String>,
    pub main_lifts: Vec<MainLift>,
    #[serde(default)]
    pub accessory_work: Vec<AccessoryWork>,
    #[serde(default)]
    pub conditioning: Vec<ConditioningBlock>,
    #[serde(default)]
    pub recovery: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainLift {
    pub name: String,
    pub sets: u32,
    pub reps: Prescription,
    pub intensity: String,
    pub rest: Prescription,
    #[serde(default)]
    pub tempo: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MainLift {
    /// Tempo cue and coaching note joined for a single cell.
    pub fn combined_notes(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(tempo) = self.tempo.as_deref().filter(|t| !t.is_empty()) {
            parts.push(format!("Tempo: {tempo}"));
        }
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            parts.push(notes.to_owned());
        }
        parts.join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryWork {
    pub name: String,
    pub sets: u32,
    pub reps: Prescription,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningBlock {
    pub modality: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ConditioningBlock {
    /// `"{minutes} min"`, followed by the note when there is one.
    pub fn summary(&self) -> String {
        match self.notes.as_deref().filter(|n| !n.is_empty()) {
            Some(notes) => format!("{} min | {notes}", self.duration_minutes),
            None => format!("{} min", self.duration_minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitoring {
    pub readiness_checks: Vec<String>,
    pub nutrition_focus: Vec<String>,
    pub recovery_protocols: Vec<String>,
}

impl WorkoutPlan {
    /// Look up a week by its number, not its position.
    pub fn week(&self, number: u32) -> Option<&TrainingWeek> {
        self.weeks.iter().find(|w| w.week == number)
    }

    /// Violations of the minimums the JSON schema cannot express on its own.
    ///
    /// An empty result means the plan is structurally usable; it says
    /// nothing about whether it matches the request.
    pub fn constraint_violations(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.cycle_length_weeks == 0 {
            issues.push("cycleLengthWeeks must be positive".to_owned());
        }
        if self.athlete_profile.primary_goals.is_empty() {
            issues.push("athleteProfile.primaryGoals must not be empty".to_owned());
        }
        if self.phases.is_empty() {
            issues.push("phases must not be empty".to_owned());
        }
        for (i, phase) in self.phases.iter().enumerate() {
            if phase.start_week == 0 || phase.end_week == 0 {
                issues.push(format!("phases[{i}] week bounds must be at least 1"));
            }
            if phase.objectives.is_empty() {
                issues.push(format!("phases[{i}].objectives must not be empty"));
            }
            if phase.key_metrics.is_empty() {
                issues.push(format!("phases[{i}].keyMetrics must not be empty"));
            }
        }
        if self.weeks.is_empty() {
            issues.push("weeks must not be empty".to_owned());
        }
        for (i, week) in self.weeks.iter().enumerate() {
            if week.week == 0 {
                issues.push(format!("weeks[{i}].week must be at least 1"));
            }
            if week.key_outcomes.is_empty() {
                issues.push(format!("weeks[{i}].keyOutcomes must not be empty"));
            }
            if week.sessions.is_empty() {
                issues.push(format!("weeks[{i}].sessions must not be empty"));
            }
            for (j, session) in week.sessions.iter().enumerate() {
                let at = format!("weeks[{i}].sessions[{j}]");
                if session.session_minutes == 0 {
                    issues.push(format!("{at}.sessionMinutes must be positive"));
                }
                if session.main_lifts.is_empty() {
                    issues.push(format!("{at}.mainLifts must not be empty"));
                }
                for (k, lift) in session.main_lifts.iter().enumerate() {
                    if lift.sets == 0 {
                        issues.push(format!("{at}.mainLifts[{k}].sets must be at least 1"));
                    }
                    if matches!(lift.rest, Prescription::Count(n) if n < 0) {
                        issues.push(format!("{at}.mainLifts[{k}].rest must not be negative"));
                    }
                }
                for (k, accessory) in session.accessory_work.iter().enumerate() {
                    if accessory.sets == 0 {
                        issues.push(format!("{at}.accessoryWork[{k}].sets must be at least 1"));
                    }
                }
                for (k, block) in session.conditioning.iter().enumerate() {
                    if block.duration_minutes == 0 {
                        issues.push(format!(
                            "{at}.conditioning[{k}].durationMinutes must be positive"
                        ));
                    }
                }
            }
        }
        let monitoring = [
            ("readinessChecks", &self.monitoring.readiness_checks),
            ("nutritionFocus", &self.monitoring.nutrition_focus),
            ("recoveryProtocols", &self.monitoring.recovery_protocols),
        ];
        for (field, list) in monitoring {
            if list.is_empty() {
                issues.push(format!("monitoring.{field} must not be empty"));
            }
        }
        if self.coaching_notes.is_empty() {
            issues.push("coachingNotes must not be empty".to_owned());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> WorkoutPlan {
        serde_json::from_value(neuraladapt_test_utils::sample_plan_json("Peak", 3, 2)).unwrap()
    }

    #[test]
    fn sample_plan_deserializes_cleanly() {
        let plan = plan();
        assert_eq!(plan.weeks.len(), 3);
        assert_eq!(plan.weeks[0].sessions.len(), 2);
        assert!(plan.constraint_violations().is_empty());
    }

    #[test]
    fn prescription_accepts_number_or_text() {
        let n: Prescription = serde_json::from_str("5").unwrap();
        let t: Prescription = serde_json::from_str("\"8-10\"").unwrap();
        assert_eq!(n, Prescription::Count(5));
        assert_eq!(t.to_string(), "8-10");
    }

    #[test]
    fn missing_optional_arrays_default_to_empty() {
        let mut value = neuraladapt_test_utils::sample_plan_json("Peak", 1, 1);
        let session = &mut value["weeks"][0]["sessions"][0];
        let obj = session.as_object_mut().unwrap();
        obj.remove("readinessCues");
        obj.remove("accessoryWork");
        let plan: WorkoutPlan = serde_json::from_value(value).unwrap();
        let session = &plan.weeks[0].sessions[0];
        assert!(session.readiness_cues.is_empty());
        assert!(session.accessory_work.is_empty());
    }

    #[test]
    fn zero_sets_is_a_violation() {
        let mut plan = plan();
        plan.weeks[1].sessions[0].main_lifts[0].sets = 0;
        let issues = plan.constraint_violations();
        assert_eq!(issues, vec!["weeks[1].sessions[0].mainLifts[0].sets must be at least 1"]);
    }

    #[test]
    fn empty_coaching_notes_is_a_violation() {
        let mut plan = plan();
        plan.coaching_notes.clear();
        assert!(
            plan.constraint_violations()
                .contains(&"coachingNotes must not be empty".to_owned())
        );
    }

    #[test]
    fn combined_notes_joins_tempo_and_note() {
        let mut lift = plan().weeks[0].sessions[0].main_lifts[0].clone();
        assert_eq!(lift.combined_notes(), "Tempo: 3-1-1");
        lift.notes = Some("Belt on top set".into());
        assert_eq!(lift.combined_notes(), "Tempo: 3-1-1 | Belt on top set");
        lift.tempo = None;
        assert_eq!(lift.combined_notes(), "Belt on top set");
    }

    #[test]
    fn conditioning_summary() {
        let mut block = plan().weeks[0].sessions[0].conditioning[0].clone();
        assert_eq!(block.summary(), "10 min | Easy pace");
        block.notes = None;
        assert_eq!(block.summary(), "10 min");
    }

    #[test]
    fn week_lookup_by_number() {
        let plan = plan();
        assert_eq!(plan.week(2).map(|w| w.week), Some(2));
        assert!(plan.week(9).is_none());
    }
}
