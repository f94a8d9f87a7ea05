//! SQLite persistence for stored workout programs and feature selections.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
