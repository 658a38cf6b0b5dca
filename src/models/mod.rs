//! Data Models

pub mod chat;

pub use chat::{ChatMessage, ChatRequest, ChatRole, FileContextEntry};
