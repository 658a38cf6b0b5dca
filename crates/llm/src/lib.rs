//! Draftbench LLM Providers
//!
//! Provider abstraction over hosted model APIs (Anthropic, OpenAI) with a
//! shared streaming event surface and a fail-fast model catalog.

pub mod anthropic;
pub mod catalog;
pub mod openai;
pub mod provider;
mod sse;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use catalog::{build_provider, parse_provider, validate_model};
pub use openai::OpenAIProvider;
pub use provider::{missing_api_key_error, parse_http_error, LlmProvider, ProviderStreamEvent};
pub use types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ProviderConfig,
    ProviderKind, StopReason, ToolCall, ToolDefinition, UsageStats,
};
