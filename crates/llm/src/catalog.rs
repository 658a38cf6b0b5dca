//! Model Catalog
//!
//! Maps (provider, model) pairs onto concrete provider instances and
//! rejects unknown combinations before any network traffic happens.

use std::sync::Arc;

use crate::anthropic::AnthropicProvider;
use crate::openai::OpenAIProvider;
use crate::provider::{missing_api_key_error, LlmProvider};
use crate::types::{LlmError, LlmResult, ProviderConfig, ProviderKind};

/// Models the service accepts, per provider.
const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-5",
    "claude-opus-4-1",
    "claude-haiku-4-5",
    "claude-3-5-haiku-latest",
];

const OPENAI_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "o3-mini"];

/// Parse a provider name from a request.
pub fn parse_provider(name: &str) -> LlmResult<ProviderKind> {
    match name.to_lowercase().as_str() {
        "anthropic" => Ok(ProviderKind::Anthropic),
        "openai" => Ok(ProviderKind::OpenAI),
        other => Err(LlmError::InvalidRequest {
            message: format!("Unknown provider: {}", other),
        }),
    }
}

/// Check that a model is in the catalog for its provider.
pub fn validate_model(provider: ProviderKind, model: &str) -> LlmResult<()> {
    let known = match provider {
        ProviderKind::Anthropic => ANTHROPIC_MODELS,
        ProviderKind::OpenAI => OPENAI_MODELS,
    };
    if known.contains(&model) {
        Ok(())
    } else {
        Err(LlmError::ModelNotFound {
            model: format!("{}/{}", provider, model),
        })
    }
}

/// Build a provider for a validated (provider, model) pair.
///
/// Fails before construction when the model is not in the catalog or the
/// config carries no API key, so a turn is rejected before any stream is
/// opened.
pub fn build_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    validate_model(config.provider, &config.model)?;
    if config.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
        return Err(missing_api_key_error(config.provider.as_str()));
    }

    Ok(match config.provider {
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config)),
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(config)),
    })
}
