//! Pagila Assist Common Error Types
//!
//! Centralized error handling for all Pagila Assist components

use std::fmt;

/// Main error type for Pagila Assist operations
#[derive(Debug)]
pub enum PagilaError {
    /// Generic error with message
    Generic(String),
    /// IO-related errors
    Io(std::io::Error),
    /// Serialization/deserialization errors
    Serde(serde_json::Error),
    /// Capability provider (LLM) errors, including timeouts
    Provider(String),
    /// Domain query tool execution errors
    Tool(String),
    /// Rental store lookup errors
    Store(String),
    /// Configuration errors
    Config(String),
}

impl fmt::Display for PagilaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagilaError::Generic(msg) => write!(f, "Pagila error: {}", msg),
            PagilaError::Io(err) => write!(f, "IO error: {}", err),
            PagilaError::Serde(err) => write!(f, "Serialization error: {}", err),
            PagilaError::Provider(msg) => write!(f, "Provider error: {}", msg),
            PagilaError::Tool(msg) => write!(f, "Tool error: {}", msg),
            PagilaError::Store(msg) => write!(f, "Store error: {}", msg),
            PagilaError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PagilaError {}

/// Convenience result type for Pagila Assist operations
pub type Result<T> = std::result::Result<T, PagilaError>;

// Implement From traits for common error types
impl From<std::io::Error> for PagilaError {
    fn from(err: std::io::Error) -> Self {
        PagilaError::Io(err)
    }
}

impl From<serde_json::Error> for PagilaError {
    fn from(err: serde_json::Error) -> Self {
        PagilaError::Serde(err)
    }
}

impl From<anyhow::Error> for PagilaError {
    fn from(err: anyhow::Error) -> Self {
        PagilaError::Generic(err.to_string())
    }
}
