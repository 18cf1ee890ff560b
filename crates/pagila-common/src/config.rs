//! Configuration types for Pagila Assist

use serde::{Deserialize, Serialize};

/// Provider configuration for LLM-backed services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Model identifier passed to the genai client (e.g. "gpt-4o-mini")
    pub model: String,
    /// Per-question timeout in seconds for the full agent exchange
    pub timeout_seconds: u64,
    /// Upper bound on tool-call round trips within a single agent turn
    pub max_tool_iterations: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
            max_tool_iterations: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.timeout_seconds, 60);
        assert_eq!(settings.max_tool_iterations, 10);
    }

    #[test]
    fn test_model_override_keeps_other_defaults() {
        let settings = ProviderSettings {
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout_seconds, 60);
    }
}
