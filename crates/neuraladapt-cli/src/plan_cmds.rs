//! CLI handlers for `neuraladapt plan` subcommands.
//!
//! Implements:
//! - `neuraladapt plan generate <file> | --id <id>` -- generate and store a plan
//! - `neuraladapt plan create <file>`               -- save an intake only
//! - `neuraladapt plan list`                        -- list saved plans
//! - `neuraladapt plan show <id> [--week N]`        -- render a plan
//! - `neuraladapt plan delete <id>`                 -- remove a plan
//! - `neuraladapt plan export <id> [--output F]`    -- write the workbook

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sqlx::SqlitePool;

use neuraladapt_core::export::{export_plan, write_workbook};
use neuraladapt_core::plan::{
    GenerationOutcome, StoredWorkoutPlan, artifact_id, generate_and_store, generate_for_stored,
    store,
};
use neuraladapt_core::viewer::{render_plan, render_week};
use neuraladapt_core::workout::{WorkoutRequest, validate_request};

use crate::{GenerationContext, PlanCommands};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    pool: &SqlitePool,
    user_id: &str,
    ctx: &GenerationContext,
) -> Result<()> {
    match command {
        PlanCommands::Generate { file, id } => match (file, id) {
            (_, Some(id)) => cmd_generate_stored(pool, user_id, &id, ctx).await,
            (Some(file), None) => cmd_generate(pool, user_id, &file, ctx).await,
            (None, None) => bail!("pass an intake file or --id"),
        },
        PlanCommands::Create { file } => cmd_create(pool, user_id, &file).await,
        PlanCommands::List => cmd_list(pool, user_id).await,
        PlanCommands::Show { plan_id, week } => cmd_show(pool, user_id, &plan_id, week).await,
        PlanCommands::Delete { plan_id } => cmd_delete(pool, user_id, &plan_id).await,
        PlanCommands::Export { plan_id, output } => {
            cmd_export(pool, user_id, &plan_id, output.as_deref(), &ctx.artifact_dir).await
        }
    }
}

/// Read an intake JSON document from a file, or stdin for `-`.
pub fn read_request(file: &str) -> Result<WorkoutRequest> {
    let content = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read intake from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read intake file: {file}"))?
    };
    serde_json::from_str(&content).with_context(|| format!("failed to parse intake file: {file}"))
}

// -----------------------------------------------------------------------
// neuraladapt plan generate
// -----------------------------------------------------------------------

async fn cmd_generate(
    pool: &SqlitePool,
    user_id: &str,
    file: &str,
    ctx: &GenerationContext,
) -> Result<()> {
    let request = read_request(file)?;
    println!(
        "Generating {} ({} weeks, {} sessions/week) with {}...",
        request.program_name,
        request.cycle_length_weeks,
        request.training_frequency,
        ctx.model.name()
    );
    let outcome = generate_and_store(pool, user_id, &request, ctx.generator()).await?;
    print_outcome(&outcome);
    Ok(())
}

async fn cmd_generate_stored(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    ctx: &GenerationContext,
) -> Result<()> {
    println!("Generating plan for saved intake {id} with {}...", ctx.model.name());
    let outcome = generate_for_stored(pool, user_id, id, ctx.generator()).await?;
    print_outcome(&outcome);
    Ok(())
}

/// Print the summary shown after a successful generation.
pub fn print_outcome(outcome: &GenerationOutcome) {
    let stored = &outcome.stored;
    println!("Plan generated successfully.");
    println!();
    println!("  Plan ID:   {}", stored.id);
    println!("  Name:      {}", stored.program_name);
    if let Some(plan) = outcome.plan() {
        println!("  Weeks:     {}", plan.weeks.len());
    }
    println!("  Attempts:  {}", outcome.attempts);
    match &stored.artifact_path {
        Some(path) => println!("  Workbook:  {path}"),
        None => println!("  Workbook:  (export failed; run `neuraladapt plan export {}`)", stored.id),
    }
}

// -----------------------------------------------------------------------
// neuraladapt plan create <file>
// -----------------------------------------------------------------------

async fn cmd_create(pool: &SqlitePool, user_id: &str, file: &str) -> Result<()> {
    let request = read_request(file)?;
    validate_request(&request).with_context(|| format!("intake in {file} is incomplete"))?;

    let stored = store::save_request(pool, user_id, &request).await?;

    println!("Intake saved.");
    println!("  Plan ID: {}", stored.id);
    println!("  Name:    {}", stored.program_name);
    println!();
    println!("Run `neuraladapt plan generate --id {}` to build the program.", stored.id);
    Ok(())
}

// -----------------------------------------------------------------------
// neuraladapt plan list
// -----------------------------------------------------------------------

async fn cmd_list(pool: &SqlitePool, user_id: &str) -> Result<()> {
    let plans = store::list_plans(pool, user_id).await?;

    if plans.is_empty() {
        println!("No plans found. Use `neuraladapt wizard` or `neuraladapt plan generate <file>` to create one.");
        return Ok(());
    }

    print!("{}", format_plan_table(&plans));
    Ok(())
}

/// Column-aligned listing of stored plans.
pub fn format_plan_table(plans: &[StoredWorkoutPlan]) -> String {
    let id_w = plans.iter().map(|p| p.id.len()).max().unwrap_or(2).max(2);
    let name_w = plans
        .iter()
        .map(|p| p.program_name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let status_w = 9;

    let mut out = format!(
        "{:<id_w$}  {:<name_w$}  {:<status_w$}  {:>5}  CREATED\n",
        "ID", "NAME", "STATUS", "WEEKS",
    );
    for plan in plans {
        let status = if plan.response_payload.is_some() {
            "generated"
        } else {
            "intake"
        };
        let created = plan.created_at.format("%Y-%m-%d %H:%M");
        out.push_str(&format!(
            "{:<id_w$}  {:<name_w$}  {:<status_w$}  {:>5}  {}\n",
            plan.id, plan.program_name, status, plan.request_payload.cycle_length_weeks, created,
        ));
    }
    out
}

// -----------------------------------------------------------------------
// neuraladapt plan show <id>
// -----------------------------------------------------------------------

async fn cmd_show(pool: &SqlitePool, user_id: &str, id: &str, week: Option<u32>) -> Result<()> {
    let stored = store::get_plan(pool, user_id, id)
        .await?
        .with_context(|| format!("plan {id} not found"))?;

    let Some(plan) = &stored.response_payload else {
        let request = &stored.request_payload;
        println!("{} (intake only, not generated yet)", stored.program_name);
        println!(
            "  {} | {} | {} weeks x {} sessions",
            request.training_focus,
            request.program_type,
            request.cycle_length_weeks,
            request.training_frequency
        );
        println!();
        println!("Run `neuraladapt plan generate --id {}` to build it.", stored.id);
        return Ok(());
    };

    match week {
        Some(n) => {
            let rendered = render_week(plan, n).with_context(|| {
                format!("plan {id} has no week {n} (weeks 1-{})", plan.weeks.len())
            })?;
            print!("{rendered}");
        }
        None => print!("{}", render_plan(plan)),
    }

    if let Some(path) = &stored.artifact_path {
        println!();
        println!("Workbook: {path}");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// neuraladapt plan delete <id>
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &SqlitePool, user_id: &str, id: &str) -> Result<()> {
    if store::delete_plan(pool, user_id, id).await? {
        println!("Plan {id} deleted.");
    } else {
        println!("No plan {id}; nothing to delete.");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// neuraladapt plan export <id>
// -----------------------------------------------------------------------

async fn cmd_export(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    output: Option<&Path>,
    artifact_dir: &Path,
) -> Result<()> {
    let stored = store::get_plan(pool, user_id, id)
        .await?
        .with_context(|| format!("plan {id} not found"))?;
    let plan = stored.response_payload.as_ref().with_context(|| {
        format!("plan {id} has not been generated yet; run `neuraladapt plan generate --id {id}`")
    })?;

    let path: PathBuf = match output {
        Some(path) => {
            write_workbook(plan, path)?;
            path.to_path_buf()
        }
        None => {
            let artifact = artifact_id(&plan.program_name, &stored.request_payload.program_name);
            let path = export_plan(plan, artifact_dir, &artifact)?;
            // The default location becomes the plan's artifact.
            store::set_artifact_path(pool, user_id, id, &path.to_string_lossy())
                .await?
                .with_context(|| format!("plan {id} vanished during export"))?;
            path
        }
    };

    println!("Workbook written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use neuraladapt_core::plan::parse_plan;
    use neuraladapt_db::models::DEFAULT_USER_ID;
    use neuraladapt_test_utils::{create_test_db, sample_plan_json, sample_request_json};

    fn request(name: &str) -> WorkoutRequest {
        serde_json::from_value(sample_request_json(name)).unwrap()
    }

    #[test]
    fn read_request_parses_intake_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("intake.json");
        std::fs::write(&path, sample_request_json("From File").to_string()).unwrap();

        let parsed = read_request(path.to_str().unwrap()).unwrap();
        assert_eq!(parsed.program_name, "From File");
        assert_eq!(parsed.cycle_length_weeks, 8);
    }

    #[test]
    fn read_request_reports_bad_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("intake.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_request(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("failed to parse intake file"));
    }

    #[tokio::test]
    async fn table_lists_status_and_weeks() {
        let pool = create_test_db().await;
        let plan = parse_plan(&sample_plan_json("Done", 8, 4).to_string()).unwrap();
        store::save_request(&pool, DEFAULT_USER_ID, &request("Pending"))
            .await
            .unwrap();
        store::save_plan(&pool, DEFAULT_USER_ID, &request("Done"), Some(&plan), None)
            .await
            .unwrap();

        let plans = store::list_plans(&pool, DEFAULT_USER_ID).await.unwrap();
        let table = format_plan_table(&plans);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("Done") && lines[1].contains("generated"));
        assert!(lines[2].contains("Pending") && lines[2].contains("intake"));
        assert!(lines[1].contains("    8  "));

        pool.close().await;
    }

    #[tokio::test]
    async fn export_requires_generated_plan() {
        let pool = create_test_db().await;
        let tmp = tempfile::TempDir::new().unwrap();
        let stored = store::save_request(&pool, DEFAULT_USER_ID, &request("Pending"))
            .await
            .unwrap();

        let err = cmd_export(&pool, DEFAULT_USER_ID, &stored.id, None, tmp.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("has not been generated yet"));

        pool.close().await;
    }

    #[tokio::test]
    async fn export_writes_to_explicit_output() {
        let pool = create_test_db().await;
        let tmp = tempfile::TempDir::new().unwrap();
        let plan = parse_plan(&sample_plan_json("Done", 2, 2).to_string()).unwrap();
        let stored = store::save_plan(&pool, DEFAULT_USER_ID, &request("Done"), Some(&plan), None)
            .await
            .unwrap();
        let output = tmp.path().join("out").join("plan.xlsx");

        cmd_export(&pool, DEFAULT_USER_ID, &stored.id, Some(&output), tmp.path())
            .await
            .unwrap();
        assert!(output.exists());

        pool.close().await;
    }

    #[tokio::test]
    async fn default_export_records_artifact_path() {
        let pool = create_test_db().await;
        let tmp = tempfile::TempDir::new().unwrap();
        let plan = parse_plan(&sample_plan_json("Done", 2, 2).to_string()).unwrap();
        let stored = store::save_plan(&pool, DEFAULT_USER_ID, &request("Done"), Some(&plan), None)
            .await
            .unwrap();

        cmd_export(&pool, DEFAULT_USER_ID, &stored.id, None, tmp.path())
            .await
            .unwrap();

        let fetched = store::get_plan(&pool, DEFAULT_USER_ID, &stored.id)
            .await
            .unwrap()
            .unwrap();
        let recorded = PathBuf::from(fetched.artifact_path.expect("artifact path recorded"));
        assert!(recorded.starts_with(tmp.path()));
        assert!(recorded.exists());
        assert!(recorded.to_string_lossy().ends_with("-done.xlsx"));

        pool.close().await;
    }

    #[tokio::test]
    async fn explicit_output_leaves_artifact_path_alone() {
        let pool = create_test_db().await;
        let tmp = tempfile::TempDir::new().unwrap();
        let plan = parse_plan(&sample_plan_json("Done", 2, 2).to_string()).unwrap();
        let stored = store::save_plan(&pool, DEFAULT_USER_ID, &request("Done"), Some(&plan), None)
            .await
            .unwrap();

        cmd_export(&pool, DEFAULT_USER_ID, &stored.id, Some(&tmp.path().join("copy.xlsx")), tmp.path())
            .await
            .unwrap();

        let fetched = store::get_plan(&pool, DEFAULT_USER_ID, &stored.id)
            .await
            .unwrap()
            .unwrap();
        assert!(fetched.artifact_path.is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn show_unknown_week_is_an_error() {
        let pool = create_test_db().await;
        let plan = parse_plan(&sample_plan_json("Done", 2, 2).to_string()).unwrap();
        let stored = store::save_plan(&pool, DEFAULT_USER_ID, &request("Done"), Some(&plan), None)
            .await
            .unwrap();

        let err = cmd_show(&pool, DEFAULT_USER_ID, &stored.id, Some(9))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("has no week 9"));
        assert!(
            cmd_show(&pool, DEFAULT_USER_ID, &stored.id, Some(2))
                .await
                .is_ok()
        );

        pool.close().await;
    }
}
