//! Core traits and types for WorkSim (CS role-play training simulator)
//!
//! This crate defines the fundamental traits and types used across the WorkSim
//! system. It provides capability-facing interfaces for vector stores, text
//! embedders, document extractors, and LLM provider routing, making the system
//! test-friendly and extensible.

pub mod embedder;
pub mod error;
pub mod extract;
pub mod provider;
pub mod types;
pub mod vector_store;

pub use embedder::Embedder;
pub use error::{Error, Result};
pub use extract::TextExtractor;
pub use provider::{Provider, ProviderBinding, route_model};
pub use types::*;
pub use vector_store::{ChunkRecord, VectorStore};
