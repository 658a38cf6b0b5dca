//! Conversation Orchestration

pub mod prompt;
pub mod queue;
pub mod service;
pub mod turn;

pub use prompt::build_system_prompt;
pub use queue::{InspectionQueue, QueuedInspectionMessage};
pub use service::ChatOrchestrator;
pub use turn::{TurnGate, TurnState};
