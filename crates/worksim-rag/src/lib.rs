//! Document ingestion and retrieval for WorkSim
//!
//! This crate provides the retrieval-augmented generation plumbing: text
//! chunking, deterministic collection naming, vector store backends,
//! embedding, file extraction, and the chat-context retriever with its
//! legacy fallback chain.

mod chunker;
mod collection;
mod embedder;
mod extract;
mod ingest;
mod local_store;
mod qdrant_store;
mod retrieval;

pub use chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, MIN_CHUNK_CHARS, chunk_text};
pub use collection::{MAX_COLLECTION_NAME, chat_fallback_chain, collection_name};
pub use embedder::HashEmbedder;
pub use extract::{ExtractorRegistry, PdfExtractor, SpreadsheetExtractor, TxtExtractor};
pub use ingest::DocumentIngestor;
pub use local_store::LocalVectorStore;
pub use qdrant_store::QdrantVectorStore;
pub use retrieval::{ContextRetriever, DEDUP_PREFIX_CHARS, MAX_CONTEXT_DOCS, dedup_documents};

// Re-export core types for convenience
pub use worksim_core::{ChunkRecord, Embedder, Error, Result, TextExtractor, VectorStore};
