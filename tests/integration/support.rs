//! Shared fixtures: a scripted provider and orchestrator constructors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use draftbench::{AppConfig, ChatMessage, ChatOrchestrator, ChatRequest, ChatRole};
use draftbench_core::ChatEvent;
use draftbench_llm::{
    LlmProvider, LlmResponse, LlmResult, Message, ProviderStreamEvent, StopReason, ToolCall,
    ToolDefinition, UsageStats,
};

/// One scripted model round: optional text plus tool calls.
pub struct Round {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Round {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            tool_calls: vec![],
        }
    }

    pub fn tools(calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }
}

/// Provider that plays back a fixed script, one round per stream call.
pub struct ScriptedProvider {
    rounds: Mutex<Vec<Round>>,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<Round>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _system: Option<String>,
        _tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        unimplemented!("integration tests use the streaming path")
    }

    async fn stream_message(
        &self,
        _messages: Vec<Message>,
        _system: Option<String>,
        _tools: Vec<ToolDefinition>,
        tx: mpsc::Sender<ProviderStreamEvent>,
    ) -> LlmResult<LlmResponse> {
        let round = self.rounds.lock().unwrap().remove(0);

        if let Some(text) = &round.text {
            let _ = tx
                .send(ProviderStreamEvent::TextDelta {
                    content: text.clone(),
                })
                .await;
        }
        for call in &round.tool_calls {
            let _ = tx
                .send(ProviderStreamEvent::ToolCallStart {
                    tool_id: call.id.clone(),
                    tool_name: call.name.clone(),
                })
                .await;
            let _ = tx
                .send(ProviderStreamEvent::ToolCallComplete {
                    tool_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                })
                .await;
        }

        let stop_reason = if round.tool_calls.is_empty() {
            StopReason::EndTurn
        } else {
            StopReason::ToolUse
        };
        Ok(LlmResponse {
            content: round.text,
            tool_calls: round.tool_calls,
            stop_reason,
            usage: UsageStats::default(),
            model: "scripted-1".to_string(),
        })
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }
}

pub fn orchestrator() -> (tempfile::TempDir, ChatOrchestrator) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        workspace_root: dir.path().to_path_buf(),
        anthropic_api_key: None,
        openai_api_key: None,
    };
    (dir, ChatOrchestrator::new(config))
}

pub fn request(content: &str, local_mode: bool) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
        }],
        model: "scripted-1".to_string(),
        provider: "scripted".to_string(),
        file_context: vec![],
        local_mode,
    }
}

pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub async fn collect(mut rx: mpsc::Receiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}
