//! Plan generation: prompts, schema, adherence checks, the retry loop,
//! storage and the service layer that joins them.

pub mod adherence;
pub mod artifact;
pub mod prompt;
pub mod schema;
pub mod service;
pub mod store;
pub mod workflow;

pub use adherence::evaluate_plan_adherence;
pub use artifact::{artifact_id, slugify};
pub use prompt::{SYSTEM_INSTRUCTION, build_base_prompt, build_retry_prompt, structured_prompt};
pub use schema::{PLAN_SCHEMA_NAME, PlanSchemaError, parse_plan, plan_json_schema};
pub use service::{
    GenerationOutcome, Generator, ServiceError, generate_and_store, generate_for_stored,
};
pub use store::StoredWorkoutPlan;
pub use workflow::{
    AttemptState, GeneratedPlan, GenerationError, MAX_GENERATION_ATTEMPTS, generate_plan,
};
