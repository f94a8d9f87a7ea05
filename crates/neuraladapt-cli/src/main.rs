mod config;
mod features_cmd;
mod plan_cmds;
mod serve_cmd;
mod wizard_cmd;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use neuraladapt_core::budget::UsageBudget;
use neuraladapt_core::llm::{OpenAiPlanModel, PlanModel};
use neuraladapt_db::models::{DEFAULT_USER_ID, Feature};
use neuraladapt_db::pool;

use config::NeuralAdaptConfig;

#[derive(Parser)]
#[command(name = "neuraladapt", about = "LLM-assisted workout program builder")]
struct Cli {
    /// Database URL (overrides NEURALADAPT_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a neuraladapt config file (no database required)
    Init {
        /// SQLite connection URL (defaults to the platform data directory)
        #[arg(long)]
        db_url: Option<String>,
        /// Model used for plan generation
        #[arg(long)]
        model: Option<String>,
        /// Directory for exported workbooks
        #[arg(long)]
        artifact_dir: Option<PathBuf>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database and run migrations
    DbInit,
    /// Workout plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Fill in the intake step by step on the terminal
    Wizard {
        /// Generate a plan from the finished intake instead of only saving it
        #[arg(long)]
        generate: bool,
    },
    /// Show or change which app modules are enabled
    Features {
        #[command(subcommand)]
        command: FeatureCommands,
    },
    /// Serve the JSON API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a plan from an intake JSON file, or for a saved intake
    Generate {
        /// Path to the intake JSON file
        #[arg(required_unless_present = "id")]
        file: Option<String>,
        /// ID of a saved intake to generate for
        #[arg(long, conflicts_with = "file")]
        id: Option<String>,
    },
    /// Save an intake JSON file without generating
    Create {
        /// Path to the intake JSON file
        file: String,
    },
    /// List saved plans, newest first
    List,
    /// Show a saved plan
    Show {
        /// Plan ID
        plan_id: String,
        /// Show a single week
        #[arg(long)]
        week: Option<u32>,
    },
    /// Delete a saved plan
    Delete {
        /// Plan ID
        plan_id: String,
    },
    /// Export a generated plan as an .xlsx workbook
    Export {
        /// Plan ID
        plan_id: String,
        /// Output file path (defaults to the artifact directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FeatureCommands {
    /// Show the current selections
    Show,
    /// Turn one module on or off
    Set {
        /// workout_programmer, journaling, or calendar
        feature: Feature,
        /// on/off, true/false, yes/no
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
}

/// Execute the `neuraladapt init` command: write config file.
fn cmd_init(
    db_url: Option<String>,
    model: Option<String>,
    artifact_dir: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let db_url = db_url.unwrap_or_else(neuraladapt_db::config::DbConfig::default_url);
    let artifact_dir = artifact_dir.unwrap_or_else(config::default_artifact_dir);

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.clone(),
        },
        llm: config::LlmSection {
            model: Some(model.unwrap_or_else(|| neuraladapt_core::llm::openai::DEFAULT_MODEL.to_owned())),
            base_url: None,
            api_key: None,
            daily_budget_cents: Some(neuraladapt_core::budget::DEFAULT_DAILY_LIMIT_CENTS),
        },
        export: config::ExportSection {
            artifact_dir: Some(artifact_dir.clone()),
        },
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  export.artifact_dir = {}", artifact_dir.display());
    println!();
    println!("Set {} to enable plan generation.", config::ENV_API_KEY);
    println!("Next: run `neuraladapt db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `neuraladapt db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &NeuralAdaptConfig) -> anyhow::Result<()> {
    println!("Initializing neuraladapt database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("neuraladapt db-init complete.");
    Ok(())
}

/// Open the pool, creating and migrating the database on first use.
async fn open_pool(resolved: &NeuralAdaptConfig) -> anyhow::Result<sqlx::SqlitePool> {
    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;
    Ok(db_pool)
}

/// Everything a generating command needs besides the pool.
pub struct GenerationContext {
    pub model: Arc<dyn PlanModel>,
    pub budget: Arc<UsageBudget>,
    pub artifact_dir: PathBuf,
}

impl GenerationContext {
    fn from_config(resolved: &NeuralAdaptConfig) -> anyhow::Result<Self> {
        let model = OpenAiPlanModel::new(resolved.llm.clone())?;
        Ok(Self {
            model: Arc::new(model),
            budget: Arc::new(UsageBudget::new(resolved.daily_budget_cents)),
            artifact_dir: resolved.artifact_dir.clone(),
        })
    }

    pub fn generator(&self) -> neuraladapt_core::plan::Generator<'_> {
        neuraladapt_core::plan::Generator {
            model: self.model.as_ref(),
            budget: &self.budget,
            artifact_dir: &self.artifact_dir,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cli_db_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Init {
            db_url,
            model,
            artifact_dir,
            force,
        } => cmd_init(db_url, model, artifact_dir, force),
        Commands::DbInit => {
            let resolved = NeuralAdaptConfig::resolve(cli_db_url)?;
            cmd_db_init(&resolved).await
        }
        Commands::Plan { command } => {
            let resolved = NeuralAdaptConfig::resolve(cli_db_url)?;
            let ctx = GenerationContext::from_config(&resolved)?;
            let db_pool = open_pool(&resolved).await?;
            let result =
                plan_cmds::run_plan_command(command, &db_pool, DEFAULT_USER_ID, &ctx).await;
            db_pool.close().await;
            result
        }
        Commands::Wizard { generate } => {
            let resolved = NeuralAdaptConfig::resolve(cli_db_url)?;
            let ctx = GenerationContext::from_config(&resolved)?;
            let db_pool = open_pool(&resolved).await?;
            let result = wizard_cmd::run_wizard(&db_pool, DEFAULT_USER_ID, &ctx, generate).await;
            db_pool.close().await;
            result
        }
        Commands::Features { command } => {
            let resolved = NeuralAdaptConfig::resolve(cli_db_url)?;
            let db_pool = open_pool(&resolved).await?;
            let result =
                features_cmd::run_features_command(command, &db_pool, DEFAULT_USER_ID).await;
            db_pool.close().await;
            result
        }
        Commands::Serve { bind, port } => {
            let resolved = NeuralAdaptConfig::resolve(cli_db_url)?;
            let ctx = GenerationContext::from_config(&resolved)?;
            let db_pool = open_pool(&resolved).await?;
            let state = serve_cmd::AppState {
                pool: db_pool.clone(),
                model: ctx.model,
                budget: ctx.budget,
                artifact_dir: Arc::new(ctx.artifact_dir),
                user_id: Arc::from(DEFAULT_USER_ID),
            };
            let result = serve_cmd::run_serve(state, &bind, port).await;
            db_pool.close().await;
            result
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
