//! Capability provider for chat completions
//!
//! This module provides the `AiService` trait agents talk to and the
//! genai-backed `LlmService` implementation, supporting single-shot
//! completions with tool calling and streamed completions.

use crate::tools::AiTool;
use anyhow::Error;
use pagila_common::PagilaError;
use async_trait::async_trait;
use futures::TryStreamExt;
use futures_util::Stream;
use genai::Client as GenaiClient;
use genai::chat::{
    ChatMessage as GenaiChatMessage, ChatStreamEvent, MessageContent, Tool,
    ToolCall as GenaiToolCall,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use tracing::{debug, info};

/// Internal representation of a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
    Tool {
        tool_name: String,
        content: String,
        call_id: Option<String>,
    },
}

impl ChatMessage {
    pub fn to_genai(&self) -> GenaiChatMessage {
        match self {
            ChatMessage::System { content } => GenaiChatMessage::system(content),
            ChatMessage::User { content } => GenaiChatMessage::user(content),
            ChatMessage::Assistant { content } => GenaiChatMessage::assistant(content),
            ChatMessage::Tool { content, .. } => {
                // TODO: switch to a proper tool-response message once genai exposes one
                GenaiChatMessage::assistant(format!("Tool result: {}", content))
            }
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,

    /// Arguments for the tool call as JSON
    pub tool_args: Value,

    /// Call ID for this tool call (used by genai)
    pub call_id: String,
}

impl From<GenaiToolCall> for ToolCall {
    fn from(call: GenaiToolCall) -> Self {
        Self {
            tool_name: call.fn_name,
            tool_args: call.fn_arguments,
            call_id: call.call_id,
        }
    }
}

/// A trait for AI services that can generate responses
///
/// Tools are supplied per call so each agent can bind its own set of domain
/// query functions while sharing one underlying client.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generate a response to a conversation
    async fn generate_response(
        &self,
        messages: &[ChatMessage],
        tools: &[Tool],
    ) -> anyhow::Result<MessageContent>;

    /// Generate a streaming response to a conversation. Messages are taken
    /// by value so the returned stream does not borrow the caller's state.
    async fn generate_response_stream(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, Error>> + Send>>, Error>;
}

/// A genai-backed chat completion service
pub struct LlmService {
    /// System prompt added when the conversation carries none of its own
    system_prompt: Option<String>,

    /// Model identifier to use
    model: String,

    /// Underlying client for the LLM
    client: GenaiClient,
}

impl LlmService {
    /// Create a new LLM service
    pub fn new(system_prompt: Option<&str>, model: &str) -> Self {
        let client = GenaiClient::builder()
            .with_chat_options(genai::chat::ChatOptions {
                capture_content: Some(true),
                capture_reasoning_content: Some(true),
                capture_tool_calls: Some(true),
                capture_usage: Some(true),
                ..Default::default()
            })
            .build();

        LlmService {
            system_prompt: system_prompt.map(|s| s.to_string()),
            model: model.to_string(),
            client,
        }
    }

    /// Set the system prompt
    pub fn set_system_prompt(&mut self, prompt: String) {
        self.system_prompt = Some(prompt);
    }

    /// Convert a tool set to genai Tool format
    pub fn genai_tools(tools: &[Box<dyn AiTool>]) -> Vec<Tool> {
        tools.iter().map(|tool| tool.to_genai_tool()).collect()
    }

    fn build_request(&self, messages: &[ChatMessage], tools: &[Tool]) -> genai::chat::ChatRequest {
        let genai_messages: Vec<GenaiChatMessage> =
            messages.iter().map(|msg| msg.to_genai()).collect();

        let mut chat_req = genai::chat::ChatRequest::new(genai_messages);

        if !tools.is_empty() {
            debug!(
                "Adding {} tools to LLM request: {:?}",
                tools.len(),
                tools.iter().map(|t| &t.name).collect::<Vec<_>>()
            );
            chat_req = chat_req.with_tools(tools.to_vec());
        }

        if let Some(prompt) = &self.system_prompt {
            let has_system = messages
                .iter()
                .any(|msg| matches!(msg, ChatMessage::System { .. }));
            if !has_system {
                chat_req = chat_req.with_system(prompt.clone());
            }
        }

        chat_req
    }
}

#[async_trait]
impl AiService for LlmService {
    async fn generate_response(
        &self,
        messages: &[ChatMessage],
        tools: &[Tool],
    ) -> anyhow::Result<MessageContent> {
        debug!(
            "Generating response for {} messages with {} tools",
            messages.len(),
            tools.len()
        );

        let chat_req = self.build_request(messages, tools);

        let response = self
            .client
            .exec_chat(&self.model, chat_req, None)
            .await
            .map_err(|e| PagilaError::Provider(e.to_string()))?;

        if let Some(content) = response.content.first() {
            match content {
                MessageContent::Text(text) => {
                    debug!("LLM returned text response ({} chars)", text.len());
                }
                MessageContent::ToolCalls(calls) => {
                    info!(
                        "LLM returned {} tool calls: {:?}",
                        calls.len(),
                        calls.iter().map(|c| &c.fn_name).collect::<Vec<_>>()
                    );
                }
                MessageContent::Parts(parts) => {
                    debug!("LLM returned {} parts", parts.len());
                }
                MessageContent::ToolResponses(responses) => {
                    debug!("LLM returned {} tool responses", responses.len());
                }
            }
        }

        response
            .content
            .first()
            .cloned()
            .ok_or_else(|| PagilaError::Provider("No content in chat response".to_string()).into())
    }

    async fn generate_response_stream(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, Error>> + Send>>, Error> {
        debug!("Streaming response for {} messages", messages.len());

        let chat_req = self.build_request(&messages, &[]);

        let genai_stream = self
            .client
            .exec_chat_stream(&self.model, chat_req, None)
            .await
            .map_err(|e| PagilaError::Provider(e.to_string()))?;

        Ok(Box::pin(
            genai_stream
                .stream
                .map_err(|e| PagilaError::Provider(e.to_string()).into()),
        ))
    }
}
