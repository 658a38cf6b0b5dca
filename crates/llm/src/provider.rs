//! LLM Provider Trait
//!
//! Defines the common interface for all hosted model providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::types::{LlmError, LlmResponse, LlmResult, Message, ToolDefinition};

/// Low-level streaming events emitted by a provider while a model round is
/// in flight. The orchestrator translates these into its own event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderStreamEvent {
    TextDelta {
        content: String,
    },
    ToolCallStart {
        tool_id: String,
        tool_name: String,
    },
    ToolCallDelta {
        tool_id: String,
        partial_arguments: String,
    },
    ToolCallComplete {
        tool_id: String,
        tool_name: String,
        arguments: String,
    },
    Error {
        message: String,
    },
}

/// Trait that all providers implement.
///
/// Provides a unified interface for:
/// - Single message completions (send_message)
/// - Streaming completions (stream_message)
/// - Health checking
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Returns whether this provider supports tool calling.
    fn supports_tools(&self) -> bool;

    /// Send a message and get a complete response.
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse>;

    /// Stream a message response via a channel.
    ///
    /// Incremental events are pushed to `tx`; the assembled response is
    /// returned once the stream closes.
    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        tx: mpsc::Sender<ProviderStreamEvent>,
    ) -> LlmResult<LlmResponse>;

    /// Check if the provider is reachable and the API key is valid.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Helper to create an error for a missing API key.
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper to map HTTP error status codes onto LlmError.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error("anthropic");
        match err {
            LlmError::AuthenticationFailed { message } => {
                assert!(message.contains("anthropic"));
            }
            _ => panic!("Expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", "openai");
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", "openai");
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(503, "overloaded", "anthropic");
        assert!(matches!(err, LlmError::ServerError { .. }));

        let err = parse_http_error(418, "teapot", "openai");
        assert!(matches!(err, LlmError::Other { .. }));
    }
}
