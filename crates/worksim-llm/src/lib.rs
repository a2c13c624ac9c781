//! Multi-provider LLM invocation for WorkSim
//!
//! This crate provides reqwest-based chat backends for the supported
//! providers, a capability table mapping providers to backends, and the
//! invoker that enforces the single-flight policy for the locally-hosted
//! provider.

mod backend;
mod claude;
mod gemini;
mod invoker;
mod ollama;
mod openai;

pub use backend::{ChatBackend, ProviderRegistry};
pub use claude::ClaudeBackend;
pub use gemini::GeminiBackend;
pub use invoker::LlmInvoker;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

// Re-export core types for convenience
pub use worksim_core::{Error, Provider, ProviderBinding, Result, route_model};
