//! Anthropic Provider
//!
//! Implementation of the LlmProvider trait for the Anthropic Messages API,
//! with SSE streaming and tool use.

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

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic provider
pub struct AnthropicProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| missing_api_key_error("anthropic"))
    }

    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
        stream: bool,
    ) -> Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "stream": stream,
            "messages": messages.iter().map(|m| self.message_to_anthropic(m)).collect::<Vec<_>>(),
        });

        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        if !tools.is_empty() {
            let defs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(defs);
        }

        body
    }

    fn message_to_anthropic(&self, message: &Message) -> Value {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        let content: Vec<Value> = message
            .content
            .iter()
            .map(|c| match c {
                MessageContent::Text { text } => serde_json::json!({
                    "type": "text",
                    "text": text,
                }),
                MessageContent::ToolUse { id, name, input } => serde_json::json!({
                    "type": "tool_use",
                    "id": id,
                    "name": name,
                    "input": input,
                }),
                MessageContent::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => serde_json::json!({
                    "type": "tool_result",
                    "tool_use_id": tool_use_id,
                    "content": content,
                    "is_error": is_error,
                }),
            })
            .collect();

        serde_json::json!({ "role": role, "content": content })
    }

    async fn post(&self, body: &Value) -> LlmResult<reqwest::Response> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(self.base_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, "anthropic"));
        }
        Ok(response)
    }

    fn parse_response(&self, response: AnthropicResponse) -> LlmResponse {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ResponseBlock::Text { text } => content.push_str(&text),
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments: input,
                    });
                }
            }
        }

        LlmResponse {
            content: (!content.is_empty()).then_some(content),
            tool_calls,
            stop_reason: response
                .stop_reason
                .as_deref()
                .map(StopReason::from)
                .unwrap_or(StopReason::EndTurn),
            usage: UsageStats {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
            model: response.model,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
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

        let parsed: AnthropicResponse = response.json().await.map_err(|e| LlmError::Parse {
            message: format!("Failed to parse response: {}", e),
        })?;

        Ok(self.parse_response(parsed))
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
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        let mut usage = UsageStats::default();
        let mut stop_reason = StopReason::EndTurn;

        // Tool-use block currently being assembled, indexed by content
        // block position.
        let mut open_block: Option<(usize, String, String, String)> = None;

        let mut buffer = SseLineBuffer::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(LlmError::from)?;

            for payload in buffer.push(&chunk) {
                let event: StreamPayload = match serde_json::from_str(&payload) {
                    Ok(ev) => ev,
                    Err(e) => {
                        warn!(error = %e, "skipping malformed stream payload");
                        continue;
                    }
                };

                match event {
                    StreamPayload::ContentBlockStart { index, content_block } => {
                        if let StartBlock::ToolUse { id, name } = content_block {
                            let _ = tx
                                .send(ProviderStreamEvent::ToolCallStart {
                                    tool_id: id.clone(),
                                    tool_name: name.clone(),
                                })
                                .await;
                            open_block = Some((index, id, name, String::new()));
                        }
                    }
                    StreamPayload::ContentBlockDelta { index, delta } => match delta {
                        DeltaBlock::TextDelta { text } => {
                            accumulated_content.push_str(&text);
                            let _ = tx
                                .send(ProviderStreamEvent::TextDelta { content: text })
                                .await;
                        }
                        DeltaBlock::InputJsonDelta { partial_json } => {
                            if let Some((open_index, id, _, args)) = open_block.as_mut() {
                                if *open_index == index {
                                    args.push_str(&partial_json);
                                    let _ = tx
                                        .send(ProviderStreamEvent::ToolCallDelta {
                                            tool_id: id.clone(),
                                            partial_arguments: partial_json,
                                        })
                                        .await;
                                }
                            }
                        }
                    },
                    StreamPayload::ContentBlockStop { index } => {
                        if open_block.as_ref().map(|b| b.0) == Some(index) {
                            if let Some((_, id, name, args)) = open_block.take() {
                                let arguments: Value = if args.is_empty() {
                                    serde_json::json!({})
                                } else {
                                    serde_json::from_str(&args).map_err(|e| LlmError::Parse {
                                        message: format!("Bad tool arguments for {}: {}", name, e),
                                    })?
                                };
                                let _ = tx
                                    .send(ProviderStreamEvent::ToolCallComplete {
                                        tool_id: id.clone(),
                                        tool_name: name.clone(),
                                        arguments: arguments.to_string(),
                                    })
                                    .await;
                                tool_calls.push(ToolCall {
                                    id,
                                    name,
                                    arguments,
                                });
                            }
                        }
                    }
                    StreamPayload::MessageDelta { delta, usage: u } => {
                        if let Some(reason) = delta.stop_reason.as_deref() {
                            stop_reason = StopReason::from(reason);
                        }
                        if let Some(u) = u {
                            usage.output_tokens = u.output_tokens.unwrap_or(usage.output_tokens);
                        }
                    }
                    StreamPayload::MessageStart { message } => {
                        usage.input_tokens = message.usage.input_tokens;
                    }
                    StreamPayload::Error { error } => {
                        let _ = tx
                            .send(ProviderStreamEvent::Error {
                                message: error.message.clone(),
                            })
                            .await;
                        return Err(LlmError::ServerError {
                            message: error.message,
                            status: None,
                        });
                    }
                    StreamPayload::Ignored => {}
                }
            }
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
        // Minimal round-trip to validate the API key.
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "ping"}],
        });
        self.post(&body).await.map(|_| ())
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: ResponseUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    MessageStart {
        message: StartMessage,
    },
    ContentBlockStart {
        index: usize,
        content_block: StartBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: DeltaBlock,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        delta: MessageDeltaBody,
        usage: Option<DeltaUsage>,
    },
    Error {
        error: StreamError,
    },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct StartMessage {
    usage: ResponseUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StartBlock {
    Text {},
    ToolUse { id: String, name: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DeltaBlock {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
}

#[derive(Debug, Deserialize)]
struct MessageDeltaBody {
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeltaUsage {
    output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}
