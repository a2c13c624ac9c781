//! Conversation orchestration for WorkSim
//!
//! Builds the role-specific Korean prompts, parses semi-structured model
//! output into typed scenarios and evaluations, and exposes the
//! [`SimulatorService`] façade that ties retrieval and LLM invocation
//! together.

pub mod parse;
pub mod prompts;
mod service;

#[cfg(test)]
mod tests;

pub use service::SimulatorService;

// Re-export core types for convenience
pub use worksim_core::{
    ChatOutcome, ChatRequest, ChatRole, ConversationTurn, DeleteOutcome, Error, Evaluation,
    HealthStatus, LocalModels, Parsed, Result, Scenario, ScenarioRequest, UploadReceipt,
};
