//! Chat Request Models
//!
//! Wire DTOs for conversation turns, camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Role of an incoming chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Full content of one client-side file, forwarded verbatim into the
/// system prompt in local mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContextEntry {
    pub name: String,
    pub content: String,
}

/// A request to run one conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub provider: String,
    #[serde(default)]
    pub file_context: Vec<FileContextEntry>,
    #[serde(default)]
    pub local_mode: bool,
}
