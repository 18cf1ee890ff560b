//! Tool trait for model-invocable functions
//!
//! Domain query functions are exposed to the model as tools. Each tool
//! carries a JSON schema for its parameters and is registered with the chat
//! request so the model can call it mid-conversation.

use anyhow::Error;
use async_trait::async_trait;
use serde_json::Value;

/// A callable function the model may invoke during generation
#[async_trait]
pub trait AiTool: Send + Sync {
    /// The name of the tool
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// The JSON schema for the tool's parameters
    fn schema(&self) -> Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Value) -> Result<Value, Error>;

    /// Validate the parameters against the schema
    fn validate_params(&self, _params: &Value) -> Result<(), Error> {
        Ok(())
    }

    /// Convert to a genai Tool
    fn to_genai_tool(&self) -> genai::chat::Tool {
        genai::chat::Tool::new(self.name())
            .with_description(self.description())
            .with_schema(self.schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl AiTool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input text"
        }

        fn schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to echo back"
                    }
                },
                "required": ["text"]
            })
        }

        async fn execute(&self, params: Value) -> Result<Value, Error> {
            if let Some(text) = params.get("text").and_then(|t| t.as_str()) {
                Ok(json!(text))
            } else {
                Err(anyhow::anyhow!("Missing 'text' parameter"))
            }
        }
    }

    #[tokio::test]
    async fn test_echo_tool() {
        let tool = EchoTool;
        let params = json!({"text": "Hello, world!"});
        let result = tool.execute(params).await.unwrap();
        assert_eq!(result.as_str().unwrap(), "Hello, world!");
    }

    #[test]
    fn test_genai_conversion() {
        let tool = EchoTool;
        let genai_tool = tool.to_genai_tool();
        assert_eq!(genai_tool.name, "echo");
    }
}
