//! In-memory vector store

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use worksim_core::{ChunkRecord, Error, Result, VectorStore};

/// In-memory, collection-scoped vector store.
///
/// The default backing for tests and single-process use; state lives only as
/// long as the process. Insertion order is preserved per collection, so
/// `peek` returns the oldest chunks first.
pub struct LocalVectorStore {
    collections: Arc<RwLock<HashMap<String, Vec<ChunkRecord>>>>,
}

impl LocalVectorStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add(&self, collection: &str, chunks: Vec<ChunkRecord>) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| Error::VectorStore(format!("lock error: {}", e)))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(chunks);
        Ok(())
    }

    async fn query(&self, collection: &str, embedding: &[f32], top_k: usize) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| Error::VectorStore(format!("lock error: {}", e)))?;

        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &ChunkRecord)> = records
            .iter()
            .map(|record| (Self::cosine_similarity(embedding, &record.embedding), record))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, r)| r.text.clone()).collect())
    }

    async fn peek(&self, collection: &str, limit: usize) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| Error::VectorStore(format!("lock error: {}", e)))?;

        Ok(collections
            .get(collection)
            .map(|records| records.iter().take(limit).map(|r| r.text.clone()).collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| Error::VectorStore(format!("lock error: {}", e)))?;
        Ok(collections.get(collection).map_or(0, |records| records.len()))
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| Error::VectorStore(format!("lock error: {}", e)))?;
        collections
            .remove(collection)
            .map(|_| ())
            .ok_or_else(|| Error::VectorStore(format!("unknown collection: {}", collection)))
    }
}
