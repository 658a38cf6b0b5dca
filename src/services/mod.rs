//! Service Layer

pub mod mirror;
pub mod orchestrator;
