//! `neuraladapt wizard`: the intake form on a terminal.
//!
//! Each step prompts for its fields in order, then asks the wizard to
//! advance. A rejected step shows the message and asks again. An empty
//! answer keeps whatever was entered before; `:back` returns to the
//! previous step and `:quit` abandons the intake.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use neuraladapt_core::plan::{generate_and_store, store};
use neuraladapt_core::wizard::{Advance, FieldKind, FieldSpec, FormWizard, WizardCompletion};
use neuraladapt_core::workout::WorkoutRequest;

use crate::GenerationContext;
use crate::plan_cmds::print_outcome;

/// Saves the finished intake, generating a plan first when asked to.
struct StoreIntake<'a> {
    pool: &'a SqlitePool,
    user_id: &'a str,
    ctx: &'a GenerationContext,
    generate: bool,
}

#[async_trait]
impl WizardCompletion for StoreIntake<'_> {
    async fn complete(&self, request: WorkoutRequest) -> Result<()> {
        if self.generate {
            println!("Generating {} with {}...", request.program_name, self.ctx.model.name());
            let outcome =
                generate_and_store(self.pool, self.user_id, &request, self.ctx.generator()).await?;
            print_outcome(&outcome);
        } else {
            let stored = store::save_request(self.pool, self.user_id, &request).await?;
            println!("Intake saved as {}.", stored.id);
            println!("Run `neuraladapt plan generate --id {}` to build the program.", stored.id);
        }
        Ok(())
    }
}

pub async fn run_wizard(
    pool: &SqlitePool,
    user_id: &str,
    ctx: &GenerationContext,
    generate: bool,
) -> Result<()> {
    let mut wizard = FormWizard::intake(StoreIntake {
        pool,
        user_id,
        ctx,
        generate,
    });

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    if !drive_wizard(&mut wizard, &mut input, &mut output).await? {
        println!("Intake abandoned; nothing was saved.");
    }
    Ok(())
}

/// Run the wizard to completion over a line-based terminal.
///
/// Returns `false` if the user quit or input ended before the last step
/// passed.
pub async fn drive_wizard<C, R, W>(
    wizard: &mut FormWizard<C>,
    input: &mut R,
    out: &mut W,
) -> Result<bool>
where
    C: WizardCompletion,
    R: BufRead,
    W: Write,
{
    'steps: loop {
        let Some(step) = wizard.current_step() else {
            return Ok(false);
        };
        let title = step.title().to_owned();
        let description = step.description().to_owned();
        let fields = step.fields();

        writeln!(out)?;
        writeln!(
            out,
            "Step {} of {}: {title}",
            wizard.index() + 1,
            wizard.step_count()
        )?;
        writeln!(out, "{description}")?;

        for field in &fields {
            write!(out, "{}", prompt_for(field, wizard.draft().input(field.key)))?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line).context("failed to read input")? == 0 {
                return Ok(false);
            }
            match line.trim() {
                ":quit" => return Ok(false),
                ":back" => {
                    wizard.back();
                    continue 'steps;
                }
                "" => {}
                answer => wizard.draft_mut().set(field.key, answer),
            }
        }

        match wizard.advance().await {
            Advance::Moved(_) => {}
            Advance::Completed => return Ok(true),
            Advance::Rejected => {
                let message = wizard.error().unwrap_or("step is incomplete");
                writeln!(out, "  ! {message}")?;
            }
        }
    }
}

/// `Label (hint) [current]: `
fn prompt_for(field: &FieldSpec, current: Option<&str>) -> String {
    let mut prompt = String::from(field.label);
    if field.required {
        prompt.push('*');
    }

    let hint = match &field.kind {
        FieldKind::Select(options) => Some(options.join("/")),
        FieldKind::Number { min, max, suffix } => Some(format!("{min}-{max} {suffix}")),
        FieldKind::Text | FieldKind::TextArea => field.placeholder.map(str::to_owned),
    };
    if let Some(hint) = hint {
        prompt.push_str(&format!(" ({hint})"));
    }
    if let Some(current) = current {
        prompt.push_str(&format!(" [{current}]"));
    }
    prompt.push_str(": ");
    prompt
}
