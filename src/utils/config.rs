//! Service Configuration
//!
//! Environment-driven configuration, read once at startup.

use std::path::PathBuf;

use draftbench_llm::ProviderKind;

use super::error::{AppError, AppResult};

const DEFAULT_WORKSPACE_ROOT: &str = "workspace";

/// Configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory of the server-side workspace store.
    pub workspace_root: PathBuf,
    /// API key for the Anthropic provider, if configured.
    pub anthropic_api_key: Option<String>,
    /// API key for the OpenAI provider, if configured.
    pub openai_api_key: Option<String>,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// Missing API keys are tolerated here; a turn against a provider with
    /// no key fails at request time instead.
    pub fn from_env() -> AppResult<Self> {
        let workspace_root = std::env::var("DRAFTBENCH_WORKSPACE_ROOT")
            .unwrap_or_else(|_| DEFAULT_WORKSPACE_ROOT.to_string());
        if workspace_root.trim().is_empty() {
            return Err(AppError::config("DRAFTBENCH_WORKSPACE_ROOT is empty"));
        }

        Ok(Self {
            workspace_root: PathBuf::from(workspace_root),
            anthropic_api_key: read_optional("ANTHROPIC_API_KEY"),
            openai_api_key: read_optional("OPENAI_API_KEY"),
        })
    }

    /// API key for a provider, if one is configured.
    pub fn api_key_for(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderKind::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

fn read_optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
