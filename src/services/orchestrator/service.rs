//! Conversation Orchestrator
//!
//! Runs conversation turns: validates the request, streams the model's
//! output as `ChatEvent`s, executes requested tools, and feeds their
//! results back to the model until it stops calling tools.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use draftbench_core::{ChatEvent, ToolOutcome, WorkspaceMode};
use draftbench_llm::{
    build_provider, parse_provider, LlmProvider, Message, ProviderConfig, ProviderStreamEvent,
    StopReason, ToolCall, ToolDefinition,
};
use draftbench_storage::{DiskBackend, StorageBackend};
use draftbench_tools::{default_file_tools, ToolContext, ToolRegistry};

use super::prompt::build_system_prompt;
use super::queue::{InspectionQueue, QueuedInspectionMessage};
use super::turn::{TurnGate, TurnState};
use crate::models::{ChatRequest, ChatRole};
use crate::utils::{AppConfig, AppError, AppResult};

/// Upper bound on model/tool rounds within one turn.
const MAX_TOOL_ROUNDS: usize = 16;

/// Buffer size for the event channels.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Orchestrates conversation turns over the registered file tools.
pub struct ChatOrchestrator {
    config: AppConfig,
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn StorageBackend>,
    gate: TurnGate,
    queue: Arc<InspectionQueue>,
}

impl ChatOrchestrator {
    pub fn new(config: AppConfig) -> Self {
        let backend: Arc<dyn StorageBackend> =
            Arc::new(DiskBackend::new(config.workspace_root.clone()));
        Self {
            config,
            registry: Arc::new(default_file_tools()),
            backend,
            gate: TurnGate::new(),
            queue: Arc::new(InspectionQueue::new()),
        }
    }

    /// Replace the storage backend (used by callers that mediate a
    /// different store than the local disk).
    pub fn with_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn queue(&self) -> &InspectionQueue {
        &self.queue
    }

    pub fn enqueue_inspection(&self, message: QueuedInspectionMessage) {
        self.queue.enqueue(message);
    }

    /// Run one conversation turn.
    ///
    /// The (provider, model) pair and credential presence are validated
    /// before any stream is opened; validation failures surface as `Err`
    /// here, never as events.
    pub fn converse(&self, request: ChatRequest) -> AppResult<mpsc::Receiver<ChatEvent>> {
        let provider_kind = parse_provider(&request.provider)?;
        let mut config = ProviderConfig::new(provider_kind, request.model.clone());
        if let Some(key) = self.config.api_key_for(provider_kind) {
            config = config.with_api_key(key);
        }
        let provider = build_provider(config)?;
        self.converse_with(request, provider)
    }

    /// Run one conversation turn against an already-built provider.
    pub fn converse_with(
        &self,
        request: ChatRequest,
        provider: Arc<dyn LlmProvider>,
    ) -> AppResult<mpsc::Receiver<ChatEvent>> {
        self.gate.begin()?;

        let mode = if request.local_mode {
            WorkspaceMode::Local
        } else {
            WorkspaceMode::Remote
        };
        let system = build_system_prompt(mode, &self.registry, &request.file_context);
        let messages = request
            .messages
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Message::user(m.content.clone()),
                ChatRole::Assistant => Message::assistant(m.content.clone()),
            })
            .collect();

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let turn = Turn {
            provider,
            registry: Arc::clone(&self.registry),
            backend: Arc::clone(&self.backend),
            mode,
            gate: self.gate.clone(),
            session_id: Uuid::new_v4().to_string(),
        };

        tokio::spawn(async move {
            turn.run(system, messages, tx).await;
        });

        Ok(rx)
    }

    /// Drain the inspection queue: one full model turn per queued message,
    /// strictly in arrival order. Returns the concatenated event log.
    pub async fn drain_inspections(&self, base: &ChatRequest) -> AppResult<Vec<ChatEvent>> {
        let provider_kind = parse_provider(&base.provider)?;
        let mut config = ProviderConfig::new(provider_kind, base.model.clone());
        if let Some(key) = self.config.api_key_for(provider_kind) {
            config = config.with_api_key(key);
        }
        let provider = build_provider(config)?;
        self.drain_inspections_with(base, provider).await
    }

    /// `drain_inspections` against an already-built provider. Each queued
    /// message runs to its terminal event before the next turn begins.
    pub async fn drain_inspections_with(
        &self,
        base: &ChatRequest,
        provider: Arc<dyn LlmProvider>,
    ) -> AppResult<Vec<ChatEvent>> {
        let mut events = Vec::new();
        while let Some(inspection) = self.queue.pop() {
            debug!(id = %inspection.id, file = %inspection.file_name, "running queued inspection");
            let mut request = base.clone();
            request.messages.push(crate::models::ChatMessage {
                role: ChatRole::User,
                content: inspection.to_prompt(),
            });

            let mut rx = self.converse_with(request, Arc::clone(&provider))?;
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// One in-flight turn: the agentic loop plus its fixed context.
struct Turn {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn StorageBackend>,
    mode: WorkspaceMode,
    gate: TurnGate,
    session_id: String,
}

impl Turn {
    async fn run(self, system: String, mut messages: Vec<Message>, tx: mpsc::Sender<ChatEvent>) {
        self.gate.advance(TurnState::Streaming);

        let tool_definitions = self.tool_definitions();

        for round in 0..MAX_TOOL_ROUNDS {
            if tx.is_closed() {
                debug!(round, "client disconnected; abandoning turn");
                self.gate.release();
                return;
            }

            let response = match self
                .stream_round(&system, &messages, &tool_definitions, &tx)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, round, "stream transport failure");
                    self.gate.advance(TurnState::Erroring);
                    let _ = tx
                        .send(ChatEvent::StreamError {
                            message: e.to_string(),
                        })
                        .await;
                    self.gate.release();
                    return;
                }
            };

            // No mutations for a client that went away mid-stream.
            if tx.is_closed() {
                debug!(round, "client disconnected mid-stream; abandoning turn");
                self.gate.release();
                return;
            }

            if response.tool_calls.is_empty() {
                self.gate.advance(TurnState::Completing);
                let _ = tx
                    .send(ChatEvent::StreamEnd {
                        stop_reason: Some(response.stop_reason.as_str().to_string()),
                    })
                    .await;
                self.gate.release();
                return;
            }

            let calls = response.tool_calls.clone();
            let results = self.execute_calls(&calls, &tx).await;

            messages.push(Message::assistant_with_tool_uses(response.content, calls));
            messages.push(Message::tool_results(results));
        }

        warn!(limit = MAX_TOOL_ROUNDS, "tool round limit reached");
        self.gate.advance(TurnState::Completing);
        let _ = tx
            .send(ChatEvent::StreamEnd {
                stop_reason: Some(StopReason::MaxTokens.as_str().to_string()),
            })
            .await;
        self.gate.release();
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry
            .definitions()
            .into_iter()
            .map(|d| ToolDefinition {
                name: d["name"].as_str().unwrap_or_default().to_string(),
                description: d["description"].as_str().unwrap_or_default().to_string(),
                input_schema: d["input_schema"].clone(),
            })
            .collect()
    }

    /// One model round: open the provider stream and forward its events
    /// until the response is assembled.
    async fn stream_round(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        tx: &mpsc::Sender<ChatEvent>,
    ) -> Result<draftbench_llm::LlmResponse, draftbench_llm::LlmError> {
        let (ptx, mut prx) = mpsc::channel::<ProviderStreamEvent>(EVENT_CHANNEL_CAPACITY);

        let forward_tx = tx.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = prx.recv().await {
                let mapped = match event {
                    ProviderStreamEvent::TextDelta { content } => {
                        Some(ChatEvent::TextDelta { content })
                    }
                    ProviderStreamEvent::ToolCallStart { tool_id, tool_name } => {
                        Some(ChatEvent::ToolCallStart {
                            tool_id,
                            tool_name,
                            partial_input: None,
                        })
                    }
                    // Argument fragments are internal; clients see the
                    // validated input on ToolCallReady.
                    ProviderStreamEvent::ToolCallDelta { .. } => None,
                    ProviderStreamEvent::ToolCallComplete {
                        tool_id,
                        tool_name,
                        arguments,
                    } => {
                        let input = serde_json::from_str(&arguments)
                            .unwrap_or(serde_json::Value::Null);
                        Some(ChatEvent::ToolCallReady {
                            tool_id,
                            tool_name,
                            input,
                        })
                    }
                    // Mid-stream provider errors surface through the
                    // stream result; the turn's error path emits the one
                    // terminal StreamError.
                    ProviderStreamEvent::Error { .. } => None,
                };
                if let Some(event) = mapped {
                    if forward_tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
        });

        let result = self
            .provider
            .stream_message(
                messages.to_vec(),
                Some(system.to_string()),
                tools.to_vec(),
                ptx,
            )
            .await;

        let _ = forwarder.await;
        result
    }

    /// Execute the round's tool calls concurrently, emit one
    /// Result/Error event per call in call order, and collect the
    /// (tool_use_id, content, is_error) triples for the next model round.
    async fn execute_calls(
        &self,
        calls: &[ToolCall],
        tx: &mpsc::Sender<ChatEvent>,
    ) -> Vec<(String, String, bool)> {
        let executions = calls.iter().map(|call| {
            let ctx = ToolContext::new(
                self.session_id.clone(),
                call.id.clone(),
                self.mode,
                Arc::clone(&self.backend),
            );
            let registry = Arc::clone(&self.registry);
            let call = call.clone();
            async move {
                if !call.arguments.is_object() {
                    return (call, None);
                }
                let outcome = registry.execute(&call.name, &ctx, call.arguments.clone()).await;
                (call, Some(outcome))
            }
        });

        let mut results = Vec::with_capacity(calls.len());
        for (call, outcome) in join_all(executions).await {
            match outcome {
                Some(outcome) => {
                    debug!(
                        tool = %call.name,
                        tool_id = %call.id,
                        success = outcome.is_success(),
                        "tool executed"
                    );
                    let is_error = !outcome.is_success();
                    results.push((call.id.clone(), outcome.to_model_content(), is_error));
                    let _ = tx
                        .send(ChatEvent::ToolResult {
                            tool_id: call.id,
                            outcome,
                        })
                        .await;
                }
                None => {
                    let message = format!("Tool {} received non-object arguments", call.name);
                    warn!(tool = %call.name, tool_id = %call.id, "malformed tool arguments");
                    results.push((call.id.clone(), format!("Error: {}", message), true));
                    let _ = tx
                        .send(ChatEvent::ToolError {
                            tool_id: call.id,
                            message,
                        })
                        .await;
                }
            }
        }
        results
    }
}
