//! Draftbench
//!
//! Backend kernel for an AI-assisted web IDE: a conversation orchestrator
//! that lets a model drive file operations through a uniform tool
//! contract, over either a server-side workspace (remote mode) or a
//! user-granted local directory relayed through the client (local mode),
//! plus the client-side mirror and autosave machinery for local mode.

pub mod models;
pub mod services;
pub mod utils;

pub use models::{ChatMessage, ChatRequest, ChatRole, FileContextEntry};
pub use services::mirror::{AutosaveScheduler, MirrorEngine};
pub use services::orchestrator::{
    ChatOrchestrator, InspectionQueue, QueuedInspectionMessage, TurnGate, TurnState,
};
pub use utils::{AppConfig, AppError, AppResult};
