//! LLM Types
//!
//! Shared request/response types for the provider layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from the provider layer.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error ({status:?}): {message}")]
    ServerError { message: String, status: Option<u16> },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Network {
            message: e.to_string(),
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Which hosted API a configuration points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration handed to a provider at construction time.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: None,
            model: model.into(),
            base_url: None,
            max_tokens: 8192,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content block inside a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

/// A conversation message in provider-neutral form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<MessageContent>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Assistant turn carrying tool invocations, as echoed back to the API
    /// on the next round of the agentic loop.
    pub fn assistant_with_tool_uses(text: Option<String>, calls: Vec<ToolCall>) -> Self {
        let mut content = Vec::new();
        if let Some(text) = text {
            if !text.is_empty() {
                content.push(MessageContent::Text { text });
            }
        }
        for call in calls {
            content.push(MessageContent::ToolUse {
                id: call.id,
                name: call.name,
                input: call.arguments,
            });
        }
        Self {
            role: MessageRole::Assistant,
            content,
        }
    }

    /// User turn carrying tool results keyed by tool_use_id.
    pub fn tool_results(results: Vec<(String, String, bool)>) -> Self {
        Self {
            role: MessageRole::User,
            content: results
                .into_iter()
                .map(|(tool_use_id, content, is_error)| MessageContent::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                })
                .collect(),
        }
    }
}

/// A tool the model may invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A completed tool invocation parsed out of a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other,
}

impl From<&str> for StopReason {
    fn from(s: &str) -> Self {
        match s {
            "end_turn" | "stop" => StopReason::EndTurn,
            "tool_use" | "tool_calls" => StopReason::ToolUse,
            "max_tokens" | "length" => StopReason::MaxTokens,
            _ => StopReason::Other,
        }
    }
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::Other => "other",
        }
    }
}

/// Token accounting for one model round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Final result of one model round, assembled from the stream.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: UsageStats,
    pub model: String,
}
