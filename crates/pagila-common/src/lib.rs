//! Pagila Common - Shared utilities and types
//!
//! This crate provides the common error type, configuration structs,
//! and the domain record types used across all Pagila Assist components.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::ProviderSettings;
pub use error::{PagilaError, Result};
pub use types::{Film, FilmSummary, Rental};
