//! Flatten a plan into worksheet rows.
//!
//! Kept free of any spreadsheet types so the layout can be checked
//! directly.

use std::fmt;

use crate::workout::{Prescription, WorkoutPlan};

/// A Summary sheet row. `bold` marks headers and the program row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: String,
    pub value: String,
    pub bold: bool,
}

impl SummaryRow {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            bold: false,
        }
    }

    fn header(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::new(key, value)
        }
    }

    fn blank() -> Self {
        Self::new("", "")
    }
}

/// A spreadsheet cell that is either numeric or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Number(i64),
    Text(String),
}

impl CellValue {
    fn na() -> Self {
        Self::Text("N/A".to_owned())
    }
}

impl From<&Prescription> for CellValue {
    fn from(p: &Prescription) -> Self {
        match p {
            Prescription::Count(n) => Self::Number(*n),
            Prescription::Text(s) => Self::Text(s.clone()),
        }
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A Sessions sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub week: u32,
    pub day: String,
    pub emphasis: String,
    pub session_minutes: u32,
    pub lift: String,
    pub sets: CellValue,
    pub reps: CellValue,
    pub intensity: String,
    pub rest: CellValue,
    pub notes: String,
}

/// `(header, column width)` for the Summary sheet.
pub const SUMMARY_COLUMNS: [(&str, f64); 2] = [("Key", 26.0), ("Details", 90.0)];

/// `(header, column width)` for the Sessions sheet, in column order.
pub const SESSION_COLUMNS: [(&str, f64); 10] = [
    ("Week", 8.0),
    ("Day", 14.0),
    ("Emphasis", 24.0),
    ("Session Minutes", 14.0),
    ("Lift/Block", 28.0),
    ("Sets", 8.0),
    ("Reps", 10.0),
    ("Intensity", 16.0),
    ("Rest", 12.0),
    ("Notes", 50.0),
];

pub fn summary_rows(plan: &WorkoutPlan) -> Vec<SummaryRow> {
    let profile = &plan.athlete_profile;
    let method = &plan.methodology;
    let constraints = if profile.constraints.is_empty() {
        "None noted".to_owned()
    } else {
        profile.constraints.join(" | ")
    };

    let mut rows = vec![
        SummaryRow::header("Program", &plan.program_name),
        SummaryRow::new("Focus", &plan.training_focus),
        SummaryRow::new("Type", &plan.program_type),
        SummaryRow::new("Cycle Length", format!("{} weeks", plan.cycle_length_weeks)),
        SummaryRow::new("Timeline", format!("{} to {}", plan.start_date, plan.end_date)),
        SummaryRow::new("Athlete Summary", &profile.summary),
        SummaryRow::new("Primary Goals", profile.primary_goals.join(" | ")),
        SummaryRow::new("Constraints", constraints),
        SummaryRow::new("Periodization", &method.periodization_model),
        SummaryRow::new("Volume Strategy", &method.volume_strategy),
        SummaryRow::new("Intensity Strategy", &method.intensity_strategy),
        SummaryRow::new("Frequency Strategy", &method.frequency_strategy),
        SummaryRow::blank(),
        SummaryRow::header("Phases", ""),
        SummaryRow::header("Phase", "Focus"),
    ];

    for phase in &plan.phases {
        let deload = phase
            .deload_week
            .map(|w| format!(", deload week {w}"))
            .unwrap_or_default();
        rows.push(SummaryRow::new(
            format!(
                "{} (Weeks {}-{}{deload})",
                phase.name, phase.start_week, phase.end_week
            ),
            format!(
                "{} | Metrics: {}",
                phase.objectives.join("; "),
                phase.key_metrics.join(", ")
            ),
        ));
    }

    let monitoring = &plan.monitoring;
    rows.extend([
        SummaryRow::blank(),
        SummaryRow::header("Monitoring", ""),
        SummaryRow::new("Readiness Checks", monitoring.readiness_checks.join(" | ")),
        SummaryRow::new("Nutrition Focus", monitoring.nutrition_focus.join(" | ")),
        SummaryRow::new("Recovery Protocols", monitoring.recovery_protocols.join(" | ")),
        SummaryRow::blank(),
        SummaryRow::header("Coaching Notes", ""),
    ]);
    rows.extend(plan.coaching_notes.iter().map(|note| SummaryRow::new("-", note)));

    rows
}

pub fn session_rows(plan: &WorkoutPlan) -> Vec<SessionRow> {
    let mut rows = Vec::new();

    for week in &plan.weeks {
        for session in &week.sessions {
            let row = |lift: String,
                       sets: CellValue,
                       reps: CellValue,
                       intensity: &str,
                       rest: CellValue,
                       notes: String| SessionRow {
                week: week.week,
                day: session.day.clone(),
                emphasis: session.emphasis.clone(),
                session_minutes: session.session_minutes,
                lift,
                sets,
                reps,
                intensity: intensity.to_owned(),
                rest,
                notes,
            };

            for lift in &session.main_lifts {
                rows.push(row(
                    lift.name.clone(),
                    lift.sets.into(),
                    (&lift.reps).into(),
                    &lift.intensity,
                    (&lift.rest).into(),
                    lift.combined_notes(),
                ));
            }
            for accessory in &session.accessory_work {
                rows.push(row(
                    format!("Accessory - {}", accessory.name),
                    accessory.sets.into(),
                    (&accessory.reps).into(),
                    "N/A",
                    CellValue::na(),
                    accessory.notes.clone().unwrap_or_default(),
                ));
            }
            for block in &session.conditioning {
                rows.push(row(
                    format!("Conditioning - {}", block.modality),
                    CellValue::na(),
                    CellValue::na(),
                    "N/A",
                    CellValue::na(),
                    block.summary(),
                ));
            }
            if !session.recovery.is_empty() {
                rows.push(row(
                    "Recovery".to_owned(),
                    CellValue::na(),
                    CellValue::na(),
                    "N/A",
                    CellValue::na(),
                    session.recovery.join(" | "),
                ));
            }
            if !session.readiness_cues.is_empty() {
                rows.push(row(
                    "Readiness".to_owned(),
                    CellValue::na(),
                    CellValue::na(),
                    "N/A",
                    CellValue::na(),
                    session.readiness_cues.join(" | "),
                ));
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(weeks: u32, sessions: u32) -> WorkoutPlan {
        serde_json::from_value(neuraladapt_test_utils::sample_plan_json("Peak", weeks, sessions))
            .unwrap()
    }

    #[test]
    fn summary_layout() {
        let rows = summary_rows(&plan(8, 4));
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Program",
                "Focus",
                "Type",
                "Cycle Length",
                "Timeline",
                "Athlete Summary",
                "Primary Goals",
                "Constraints",
                "Periodization",
                "Volume Strategy",
                "Intensity Strategy",
                "Frequency Strategy",
                "",
                "Phases",
                "Phase",
                "Accumulation (Weeks 1-8)",
                "",
                "Monitoring",
                "Readiness Checks",
                "Nutrition Focus",
                "Recovery Protocols",
                "",
                "Coaching Notes",
                "-",
            ]
        );
        assert_eq!(rows[3].value, "8 weeks");
        assert_eq!(rows[4].value, "2025-01-06 to 2025-03-02");
        assert_eq!(rows[7].value, "None noted");
        assert_eq!(rows[15].value, "Build work capacity | Metrics: Weekly tonnage");
        assert!(rows[0].bold);
        assert!(!rows[1].bold);
        assert!(rows[13].bold && rows[14].bold);
    }

    #[test]
    fn phase_key_mentions_deload() {
        let mut plan = plan(4, 1);
        plan.phases[0].deload_week = Some(4);
        plan.athlete_profile.constraints = vec!["Knee".into(), "Time".into()];
        let rows = summary_rows(&plan);
        assert_eq!(rows[15].key, "Accumulation (Weeks 1-4, deload week 4)");
        assert_eq!(rows[7].value, "Knee | Time");
    }

    #[test]
    fn one_session_expands_to_five_rows() {
        let rows = session_rows(&plan(1, 1));
        let lifts: Vec<&str> = rows.iter().map(|r| r.lift.as_str()).collect();
        assert_eq!(
            lifts,
            vec![
                "Back Squat",
                "Accessory - Walking Lunge",
                "Conditioning - Bike",
                "Recovery",
                "Readiness",
            ]
        );

        let main = &rows[0];
        assert_eq!(main.week, 1);
        assert_eq!(main.day, "Day 1");
        assert_eq!(main.session_minutes, 75);
        assert_eq!(main.sets, CellValue::Number(4));
        assert_eq!(main.reps, CellValue::Number(5));
        assert_eq!(main.rest, CellValue::Text("3 min".into()));
        assert_eq!(main.notes, "Tempo: 3-1-1");

        let accessory = &rows[1];
        assert_eq!(accessory.reps, CellValue::Text("10 each".into()));
        assert_eq!(accessory.intensity, "N/A");
        assert_eq!(accessory.notes, "");

        assert_eq!(rows[2].notes, "10 min | Easy pace");
        assert_eq!(rows[2].sets.to_string(), "N/A");
        assert_eq!(rows[3].notes, "Foam roll quads");
        assert_eq!(rows[4].notes, "Bar speed check");
    }

    #[test]
    fn empty_recovery_and_readiness_emit_no_rows() {
        let mut plan = plan(1, 1);
        let session = &mut plan.weeks[0].sessions[0];
        session.recovery.clear();
        session.readiness_cues.clear();
        session.conditioning.clear();
        assert_eq!(session_rows(&plan).len(), 2);
    }

    #[test]
    fn rows_cover_every_session() {
        assert_eq!(session_rows(&plan(8, 4)).len(), 8 * 4 * 5);
    }
}
