//! Handoff edges between agents
//!
//! A handoff edge is a directed, advisory routing rule from one agent to
//! another. The edge is rendered to the provider as one more callable
//! function; when the source agent's model calls it, control of the
//! conversation moves to the target agent. The description is interpreted by
//! the model, not enforced by deterministic code.

use genai::chat::Tool;
use serde_json::json;

/// A directed routing rule from one agent to another
#[derive(Debug, Clone)]
pub struct HandoffEdge {
    /// Name of the agent that may traverse this edge
    pub source: String,
    /// Name of the agent that receives the conversation
    pub target: String,
    /// Natural-language guidance on when to traverse the edge
    pub description: String,
}

impl HandoffEdge {
    /// Create a new edge
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            description: description.into(),
        }
    }

    /// Function name under which the edge is exposed to the model
    pub fn tool_name(&self) -> String {
        format!("transfer_to_{}", self.target.to_lowercase())
    }

    /// Render the edge as a genai tool the source agent can call
    pub fn to_genai_tool(&self) -> Tool {
        Tool::new(self.tool_name())
            .with_description(&self.description)
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Short reason for transferring the conversation"
                    }
                }
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_derivation() {
        let edge = HandoffEdge::new("SearchAgent", "LLMAgent", "For out-of-domain questions");
        assert_eq!(edge.tool_name(), "transfer_to_llmagent");
    }

    #[test]
    fn test_genai_tool_rendering() {
        let edge = HandoffEdge::new("SearchAgent", "LLMAgent", "For out-of-domain questions");
        let tool = edge.to_genai_tool();
        assert_eq!(tool.name, "transfer_to_llmagent");
    }
}
