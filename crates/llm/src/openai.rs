//! OpenAI Provider
//!
//! Implementation of the LlmProvider trait for the OpenAI Chat Completions
//! API, with SSE streaming and tool calls.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use crate::provider::{missing_api_key_error, parse_http_error, LlmProvider, ProviderStreamEvent};
use crate::sse::SseLineBuffer;
use crate::types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ProviderConfig,
    StopReason, ToolCall, ToolDefinition, UsageStats,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODELS_URL: &str = "https://api.openai.com/v1/models";

/// OpenAI provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_api_key_error("openai"))
    }

    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
        stream: bool,
    ) -> Value {
        let mut openai_messages: Vec<Value> = Vec::new();

        if let Some(sys) = system {
            openai_messages.push(serde_json::json!({
                "role": "system",
                "content": sys,
            }));
        }

        for msg in messages {
            openai_messages.extend(self.message_to_openai(msg));
        }

        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "stream": stream,
            "messages": openai_messages,
        });

        if !tools.is_empty() {
            let defs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.input_schema,
                        }
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(defs);
        }

        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        body
    }

    /// Convert a provider-neutral message to OpenAI wire messages. Tool
    /// results become one `role: tool` message each.
    fn message_to_openai(&self, message: &Message) -> Vec<Value> {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        let mut out = Vec::new();
        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text { text } => text_parts.push(text.as_str()),
                MessageContent::ToolUse { id, name, input } => {
                    tool_calls.push(serde_json::json!({
                        "id": id,
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": input.to_string(),
                        }
                    }));
                }
                MessageContent::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => {
                    out.push(serde_json::json!({
                        "role": "tool",
                        "tool_call_id": tool_use_id,
                        "content": content,
                    }));
                }
            }
        }

        if !tool_calls.is_empty() {
            let mut msg = serde_json::json!({
                "role": role,
                "tool_calls": tool_calls,
            });
            // Some OpenAI-compatible APIs require the content field even
            // when the assistant only emits tool calls.
            msg["content"] = if text_parts.is_empty() {
                Value::Null
            } else {
                serde_json::json!(text_parts.join("\n"))
            };
            out.insert(0, msg);
        } else if !text_parts.is_empty() {
            out.insert(
                0,
                serde_json::json!({
                    "role": role,
                    "content": text_parts.join("\n"),
                }),
            );
        }

        out
    }

    async fn post(&self, body: &Value) -> LlmResult<reqwest::Response> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, "openai"));
        }
        Ok(response)
    }

    fn parse_response(&self, response: OpenAIResponse) -> LlmResult<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse {
                message: "Response carried no choices".to_string(),
            })?;

        let mut tool_calls = Vec::new();
        if let Some(tcs) = choice.message.as_ref().and_then(|m| m.tool_calls.as_ref()) {
            for tc in tcs {
                let arguments =
                    serde_json::from_str(&tc.function.arguments).map_err(|e| LlmError::Parse {
                        message: format!("Bad tool arguments for {}: {}", tc.function.name, e),
                    })?;
                tool_calls.push(ToolCall {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    arguments,
                });
            }
        }

        Ok(LlmResponse {
            content: choice.message.and_then(|m| m.content),
            tool_calls,
            stop_reason: choice
                .finish_reason
                .as_deref()
                .map(StopReason::from)
                .unwrap_or(StopReason::EndTurn),
            usage: response
                .usage
                .map(|u| UsageStats {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                })
                .unwrap_or_default(),
            model: response.model,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request_body(&messages, system.as_deref(), &tools, false);
        let response = self.post(&body).await?;

        let parsed: OpenAIResponse = response.json().await.map_err(|e| LlmError::Parse {
            message: format!("Failed to parse response: {}", e),
        })?;

        self.parse_response(parsed)
    }

    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        tx: mpsc::Sender<ProviderStreamEvent>,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request_body(&messages, system.as_deref(), &tools, true);
        let response = self.post(&body).await?;

        let mut accumulated_content = String::new();
        let mut usage = UsageStats::default();
        let mut stop_reason = StopReason::EndTurn;

        // Tool calls arrive as indexed argument fragments; assemble them
        // per index and finalize when the stream closes.
        let mut pending: Vec<PendingToolCall> = Vec::new();

        let mut buffer = SseLineBuffer::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(LlmError::from)?;

            for payload in buffer.push(&chunk) {
                let event: StreamChunk = match serde_json::from_str(&payload) {
                    Ok(ev) => ev,
                    Err(e) => {
                        warn!(error = %e, "skipping malformed stream payload");
                        continue;
                    }
                };

                if let Some(u) = event.usage {
                    usage.input_tokens = u.prompt_tokens;
                    usage.output_tokens = u.completion_tokens;
                }

                let Some(choice) = event.choices.into_iter().next() else {
                    continue;
                };

                if let Some(reason) = choice.finish_reason.as_deref() {
                    stop_reason = StopReason::from(reason);
                }

                let Some(delta) = choice.delta else { continue };

                if let Some(text) = delta.content {
                    if !text.is_empty() {
                        accumulated_content.push_str(&text);
                        let _ = tx
                            .send(ProviderStreamEvent::TextDelta { content: text })
                            .await;
                    }
                }

                for fragment in delta.tool_calls.unwrap_or_default() {
                    while pending.len() <= fragment.index {
                        pending.push(PendingToolCall::default());
                    }
                    let slot = &mut pending[fragment.index];

                    if let Some(id) = fragment.id {
                        slot.id = id;
                    }
                    if let Some(function) = fragment.function {
                        if let Some(name) = function.name {
                            slot.name = name;
                            let _ = tx
                                .send(ProviderStreamEvent::ToolCallStart {
                                    tool_id: slot.id.clone(),
                                    tool_name: slot.name.clone(),
                                })
                                .await;
                        }
                        if let Some(args) = function.arguments {
                            slot.arguments.push_str(&args);
                            let _ = tx
                                .send(ProviderStreamEvent::ToolCallDelta {
                                    tool_id: slot.id.clone(),
                                    partial_arguments: args,
                                })
                                .await;
                        }
                    }
                }
            }
        }

        let mut tool_calls = Vec::new();
        for slot in pending {
            let arguments: Value = if slot.arguments.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&slot.arguments).map_err(|e| LlmError::Parse {
                    message: format!("Bad tool arguments for {}: {}", slot.name, e),
                })?
            };
            let _ = tx
                .send(ProviderStreamEvent::ToolCallComplete {
                    tool_id: slot.id.clone(),
                    tool_name: slot.name.clone(),
                    arguments: arguments.to_string(),
                })
                .await;
            tool_calls.push(ToolCall {
                id: slot.id,
                name: slot.name,
                arguments,
            });
        }

        Ok(LlmResponse {
            content: (!accumulated_content.is_empty()).then_some(accumulated_content),
            tool_calls,
            stop_reason,
            usage,
            model: self.config.model.clone(),
        })
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(OPENAI_MODELS_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "openai"))
        }
    }
}

#[derive(Debug, Default)]
struct PendingToolCall {
    id: String,
    name: String,
    arguments: String,
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<WireMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCallFragment>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCallFragment {
    index: usize,
    id: Option<String>,
    function: Option<StreamFunctionFragment>,
}

#[derive(Debug, Deserialize)]
struct StreamFunctionFragment {
    name: Option<String>,
    arguments: Option<String>,
}
