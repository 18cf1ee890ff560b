//! LLM integration for Pagila Assist
//!
//! This crate provides the capability-provider abstraction: the chat message
//! model, the `AiService` trait that agents talk to, and the genai-backed
//! `LlmService` implementation.

pub mod llm;
pub mod tools;

// Re-export key types for convenience
pub use llm::{AiService, ChatMessage, LlmService, ToolCall};
pub use tools::AiTool;
