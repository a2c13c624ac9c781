//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// An embedded document chunk as stored in a collection.
///
/// Chunk ids follow `{file_id}_chunk_{index}` and are unique within their
/// collection. Records are immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// Trait for collection-scoped vector stores (e.g., Qdrant or in-memory).
///
/// Collections are created lazily on first write or first read; resolving a
/// collection that was never written to is not an error: reads return empty
/// results so retrieval fallback can take over.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append chunks to a collection, creating it if needed. No dedup.
    async fn add(&self, collection: &str, chunks: Vec<ChunkRecord>) -> Result<()>;

    /// Nearest-neighbor search by embedding. Returns up to `top_k` document
    /// texts ranked by the backing index's distance metric. Unknown
    /// collections yield an empty list.
    async fn query(&self, collection: &str, embedding: &[f32], top_k: usize) -> Result<Vec<String>>;

    /// An unranked sample of up to `limit` stored texts (no query vector).
    /// Ordering is backend-defined; the in-memory backend preserves
    /// insertion order.
    async fn peek(&self, collection: &str, limit: usize) -> Result<Vec<String>>;

    /// Number of chunks in a collection; 0 for unknown collections.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Irreversibly drop a collection. Deleting an unknown collection is an
    /// error so callers can report it.
    async fn delete_collection(&self, collection: &str) -> Result<()>;
}
