//! Direct question streaming
//!
//! The single-agent ask path: one store-clerk persona, no tools, answer
//! streamed back chunk by chunk. Used by the CLI for interactive questions
//! that do not need the full handoff orchestration.

use anyhow::{Error, anyhow};
use futures_util::{Stream, StreamExt, future};
use genai::chat::ChatStreamEvent;
use pagila_llm::{AiService, ChatMessage};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};

const ASK_SYSTEM_PROMPT: &str = "You are a helpful assistant for a DVD rental store called Pagila. \
You can help customers find movies, understand rental policies, and \
provide general assistance with the DVD rental service.";

/// Streams answers to free-form questions
pub struct AskService {
    provider: Arc<dyn AiService>,
}

impl AskService {
    pub fn new(provider: Arc<dyn AiService>) -> Self {
        Self { provider }
    }

    /// Stream the answer to a question as text chunks. Empty chunks are
    /// dropped; provider errors come through as stream items.
    pub async fn ask_question(
        &self,
        question: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>, Error> {
        let question = question.trim();
        if question.is_empty() {
            return Err(anyhow!("Question cannot be empty"));
        }

        debug!(question_length = question.len(), "streaming question");

        let messages = vec![
            ChatMessage::System {
                content: ASK_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage::User {
                content: question.to_string(),
            },
        ];

        let events = self.provider.generate_response_stream(messages).await?;

        let chunks = events
            .scan((0usize, 0usize), |(chunk_count, total_len), event| {
                let item = match event {
                    Ok(ChatStreamEvent::Chunk(chunk)) => {
                        if chunk.content.trim().is_empty() {
                            None
                        } else {
                            *chunk_count += 1;
                            *total_len += chunk.content.len();
                            Some(Ok(chunk.content))
                        }
                    }
                    Ok(ChatStreamEvent::End(_)) => {
                        info!(
                            chunks = *chunk_count,
                            response_length = *total_len,
                            "question stream complete"
                        );
                        None
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                };
                future::ready(Some(item))
            })
            .filter_map(future::ready);

        Ok(Box::pin(chunks))
    }
}
