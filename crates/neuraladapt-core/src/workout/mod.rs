//! Intake and plan types shared by every layer.

mod plan;
mod request;

pub use plan::{
    AccessoryWork, AthleteProfile, ConditioningBlock, MainLift, Methodology, Monitoring, Phase,
    Prescription, TrainingSession, TrainingWeek, WorkoutPlan,
};
pub use request::{
    PowerliftingStats, ProgramType, RequestValidationError, TrainingFocus, WorkoutRequest,
    validate_request,
};
