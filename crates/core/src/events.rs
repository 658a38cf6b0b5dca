//! Chat Stream Events
//!
//! The incremental event sequence a conversation turn produces: text
//! deltas interleaved with tool-call lifecycle events. For a given tool
//! call id the order is always Start → Ready → exactly one of
//! Result/Error; text deltas may interleave with events from other calls
//! but never reorder relative to their own call id.

use serde::{Deserialize, Serialize};

use crate::outcome::ToolOutcome;

/// One event in a conversation turn's output stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Text content delta from the model
    TextDelta { content: String },

    /// The model began emitting a tool call; arguments may still be partial
    ToolCallStart {
        tool_id: String,
        tool_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        partial_input: Option<String>,
    },

    /// Tool call arguments are complete and validated
    ToolCallReady {
        tool_id: String,
        tool_name: String,
        input: serde_json::Value,
    },

    /// The tool executed; carries the structured outcome
    ToolResult {
        tool_id: String,
        outcome: ToolOutcome,
    },

    /// The tool call itself could not be dispatched (malformed arguments,
    /// unknown tool). Distinct from a `ToolResult` carrying a failure.
    ToolError { tool_id: String, message: String },

    /// Provider transport failure; aborts the turn, conversation resumable
    StreamError { message: String },

    /// The turn completed; all tool results have been flushed
    StreamEnd {
        #[serde(skip_serializing_if = "Option::is_none")]
        stop_reason: Option<String>,
    },
}

impl ChatEvent {
    /// The tool call id this event belongs to, if any.
    pub fn tool_id(&self) -> Option<&str> {
        match self {
            ChatEvent::ToolCallStart { tool_id, .. }
            | ChatEvent::ToolCallReady { tool_id, .. }
            | ChatEvent::ToolResult { tool_id, .. }
            | ChatEvent::ToolError { tool_id, .. } => Some(tool_id),
            _ => None,
        }
    }

    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::StreamEnd { .. } | ChatEvent::StreamError { .. })
    }
}
