//! Domain logic for the NeuralAdapt workout programmer.
//!
//! Intake types and validation live in [`workout`], the LLM-backed
//! generation loop in [`plan`], and the presentation layers in [`export`]
//! and [`viewer`].

pub mod budget;
pub mod export;
pub mod llm;
pub mod plan;
pub mod viewer;
pub mod wizard;
pub mod workout;
