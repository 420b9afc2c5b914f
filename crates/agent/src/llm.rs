//! Completion capability.
//!
//! The language model is consumed as an opaque service: given the rendered
//! context and the declared tool set, it answers with either a final text or
//! a request to invoke a named tool. `CompletionClient` is the seam; the
//! shipped implementation speaks the OpenAI-compatible chat-completions
//! dialect, which every provider the project targets exposes.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use carbot_core::config::LlmConfig;

use crate::tools::ToolDeclaration;

#[derive(Clone, Debug)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant { content: Option<String>, tool_calls: Vec<ToolCallRequest> },
    ToolResult { call_id: String, content: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    Final(String),
    ToolCalls(Vec<ToolCallRequest>),
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm.api_key is not configured")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion response was malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<CompletionOutcome, LlmError>;
}

pub struct OpenAiCompatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolDeclaration]) -> Value {
        let wire_messages: Vec<Value> = messages.iter().map(wire_message).collect();
        let wire_tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.input_schema,
                    }
                })
            })
            .collect();

        json!({
            "model": self.model,
            "messages": wire_messages,
            "tools": wire_tools,
        })
    }
}

fn wire_message(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System(content) => json!({ "role": "system", "content": content }),
        ChatMessage::User(content) => json!({ "role": "user", "content": content }),
        ChatMessage::Assistant { content, tool_calls } => {
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            if calls.is_empty() {
                json!({ "role": "assistant", "content": content })
            } else {
                json!({ "role": "assistant", "content": content, "tool_calls": calls })
            }
        }
        ChatMessage::ToolResult { call_id, content } => {
            json!({ "role": "tool", "tool_call_id": call_id, "content": content })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
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

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<CompletionOutcome, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(messages, tools))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|err| LlmError::Malformed(err.to_string()))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::Malformed("response carried no choices".to_string()))?;

        if !message.tool_calls.is_empty() {
            let calls = message
                .tool_calls
                .into_iter()
                .map(|call| {
                    let arguments: Value =
                        serde_json::from_str(&call.function.arguments).map_err(|err| {
                            LlmError::Malformed(format!(
                                "tool call `{}` carried unparseable arguments: {err}",
                                call.function.name
                            ))
                        })?;
                    Ok(ToolCallRequest { id: call.id, name: call.function.name, arguments })
                })
                .collect::<Result<Vec<_>, LlmError>>()?;
            debug!(event_name = "llm.tool_calls", count = calls.len(), "model requested tools");
            return Ok(CompletionOutcome::ToolCalls(calls));
        }

        message
            .content
            .map(CompletionOutcome::Final)
            .ok_or_else(|| LlmError::Malformed("response had neither content nor tool calls".to_string()))
    }
}
