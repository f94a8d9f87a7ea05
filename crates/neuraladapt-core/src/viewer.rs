//! Read-only text rendering of a plan.

use crate::workout::{TrainingSession, TrainingWeek, WorkoutPlan};

const LIFT_HEADERS: [&str; 5] = ["Exercise", "Sets", "Reps", "Intensity", "Rest/Tempo/Notes"];

/// Render the whole plan: overview sections followed by every week.
pub fn render_plan(plan: &WorkoutPlan) -> String {
    let mut out = render_overview(plan);
    for week in &plan.weeks {
        out.push('\n');
        out.push_str(&render_training_week(week));
    }
    out
}

/// Render a single week by number, or `None` if the plan has no such week.
pub fn render_week(plan: &WorkoutPlan, week: u32) -> Option<String> {
    plan.week(week).map(render_training_week)
}

/// Everything above the week breakdown.
pub fn render_overview(plan: &WorkoutPlan) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", plan.program_name));
    out.push_str(&format!("{} | {}\n", plan.training_focus, plan.program_type));
    out.push_str(&format!(
        "{} to {} | {} week cycle\n",
        plan.start_date, plan.end_date, plan.cycle_length_weeks
    ));

    let profile = &plan.athlete_profile;
    section(&mut out, "Athlete Profile");
    out.push_str(&format!("  {}\n", profile.summary));
    bullets(&mut out, "Primary goals", &profile.primary_goals);
    if profile.constraints.is_empty() {
        out.push_str("  Constraints: None noted\n");
    } else {
        bullets(&mut out, "Constraints", &profile.constraints);
    }

    let method = &plan.methodology;
    section(&mut out, "Methodology");
    out.push_str(&format!("  Periodization:      {}\n", method.periodization_model));
    out.push_str(&format!("  Volume strategy:    {}\n", method.volume_strategy));
    out.push_str(&format!("  Intensity strategy: {}\n", method.intensity_strategy));
    out.push_str(&format!("  Frequency strategy: {}\n", method.frequency_strategy));

    section(&mut out, "Phases");
    for phase in &plan.phases {
        let deload = phase
            .deload_week
            .map(|w| format!(", deload week {w}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} (Weeks {}-{}{deload})\n",
            phase.name, phase.start_week, phase.end_week
        ));
        out.push_str(&format!("    Objectives:  {}\n", phase.objectives.join("; ")));
        out.push_str(&format!("    Key metrics: {}\n", phase.key_metrics.join(", ")));
    }

    let monitoring = &plan.monitoring;
    section(&mut out, "Monitoring");
    bullets(&mut out, "Readiness checks", &monitoring.readiness_checks);
    bullets(&mut out, "Nutrition focus", &monitoring.nutrition_focus);
    bullets(&mut out, "Recovery protocols", &monitoring.recovery_protocols);

    section(&mut out, "Coaching Notes");
    for note in &plan.coaching_notes {
        out.push_str(&format!("  - {note}\n"));
    }

    out
}

fn render_training_week(week: &TrainingWeek) -> String {
    let mut out = format!("=== Week {}: {} ===\n", week.week, week.focus);
    out.push_str(&format!("Key outcomes: {}\n", week.key_outcomes.join(" | ")));
    for session in &week.sessions {
        out.push('\n');
        render_session(&mut out, session);
    }
    out
}

fn render_session(out: &mut String, session: &TrainingSession) {
    out.push_str(&format!(
        "{} - {} ({} min)\n",
        session.day, session.emphasis, session.session_minutes
    ));
    if !session.readiness_cues.is_empty() {
        out.push_str(&format!(
            "  Readiness cues: {}\n",
            session.readiness_cues.join(" | ")
        ));
    }

    let rows: Vec<[String; 5]> = session
        .main_lifts
        .iter()
        .map(|lift| {
            let mut detail = vec![format!("Rest {}", lift.rest)];
            let extra = lift.combined_notes();
            if !extra.is_empty() {
                detail.push(extra);
            }
            [
                lift.name.clone(),
                lift.sets.to_string(),
                lift.reps.to_string(),
                lift.intensity.clone(),
                detail.join(" | "),
            ]
        })
        .collect();
    table(out, &LIFT_HEADERS, &rows);

    if !session.accessory_work.is_empty() {
        out.push_str("  Accessories:\n");
        for accessory in &session.accessory_work {
            out.push_str(&format!(
                "    {} {} x {}",
                accessory.name, accessory.sets, accessory.reps
            ));
            if let Some(notes) = accessory.notes.as_deref().filter(|n| !n.is_empty()) {
                out.push_str(&format!(" ({notes})"));
            }
            out.push('\n');
        }
    }
    if !session.conditioning.is_empty() {
        out.push_str("  Conditioning:\n");
        for block in &session.conditioning {
            out.push_str(&format!("    {}: {}\n", block.modality, block.summary()));
        }
    }
    if !session.recovery.is_empty() {
        out.push_str(&format!("  Recovery: {}\n", session.recovery.join(" | ")));
    }
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n{title}\n"));
}

fn bullets(out: &mut String, label: &str, items: &[String]) {
    out.push_str(&format!("  {label}:\n"));
    for item in items {
        out.push_str(&format!("    - {item}\n"));
    }
}

/// Left-aligned columns padded to the widest cell, indented two spaces.
fn table<const N: usize>(out: &mut String, headers: &[&str; N], rows: &[[String; N]]) {
    let mut widths: [usize; N] = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    out.push_str(&line(headers.to_vec()));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> WorkoutPlan {
        serde_json::from_value(neuraladapt_test_utils::sample_plan_json("Spring Peak", 3, 2))
            .unwrap()
    }

    #[test]
    fn overview_sections_in_order() {
        let text = render_plan(&plan());
        let positions: Vec<usize> = [
            "Spring Peak",
            "Athlete Profile",
            "Methodology",
            "Phases",
            "Monitoring",
            "Coaching Notes",
            "=== Week 1",
            "=== Week 2",
            "=== Week 3",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn header_lines() {
        let text = render_overview(&plan());
        assert!(text.starts_with("Spring Peak\nPowerlifting | Mesocycle\n2025-01-06 to 2025-03-02 | 3 week cycle\n"));
        assert!(text.contains("Constraints: None noted"));
        assert!(text.contains("  Accumulation (Weeks 1-3)"));
    }

    #[test]
    fn week_renders_lift_table() {
        let text = render_week(&plan(), 2).unwrap();
        assert!(text.starts_with("=== Week 2: Week 2 focus ==="));
        assert!(!text.contains("Week 1 focus"));
        assert!(text.contains("Exercise"));
        assert!(text.contains("Rest/Tempo/Notes"));
        assert!(text.contains("Back Squat"));
        assert!(text.contains("Rest 3 min | Tempo: 3-1-1"));
        assert!(text.contains("Walking Lunge 3 x 10 each"));
        assert!(text.contains("Bike: 10 min | Easy pace"));
        assert!(text.contains("Recovery: Foam roll quads"));
        assert!(text.contains("Readiness cues: Bar speed check"));
        assert_eq!(text.matches("Day ").count(), 2);
    }

    #[test]
    fn unknown_week_is_none() {
        assert!(render_week(&plan(), 4).is_none());
    }

    #[test]
    fn table_columns_align() {
        let mut out = String::new();
        table(
            &mut out,
            &["A", "Long header"],
            &[["wide cell".to_owned(), "x".to_owned()]],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  A          Long header");
        assert_eq!(lines[1], "  ---------  -----------");
        assert_eq!(lines[2], "  wide cell  x");
    }
}
