//! Pagila Agents - Agent system and handoff orchestration
//!
//! This crate provides the two assistant personas for the Pagila rental
//! store, the domain query tools they can call, and the handoff controller
//! that routes a question through the front-desk agent with an optional
//! single handoff to the general-knowledge agent.

pub mod ask;
pub mod definition;
pub mod handoff;
pub mod orchestration;
pub mod store;
pub mod summary;
pub mod tools;

// Re-export key types for convenience
pub use ask::AskService;
pub use definition::{
    AgentBuilder, AgentDefinition, FRONT_DESK_AGENT, GENERAL_AGENT, SYSTEM_FALLBACK_AGENT,
};
pub use handoff::HandoffEdge;
pub use orchestration::{
    ConversationTurn, HandoffController, HandoffOutcome, OrchestrationRun, OutcomeMetadata,
    TurnRole,
};
pub use store::{InMemoryRentalStore, RentalStore};
pub use summary::SummaryService;
