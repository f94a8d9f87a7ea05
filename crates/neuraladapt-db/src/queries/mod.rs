//! Query functions, one module per table.

pub mod feature_selections;
pub mod workout_plans;
