//! Document ingestion pipeline

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use worksim_core::{ChunkRecord, Embedder, Error, Result, UploadReceipt, VectorStore};

use crate::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, chunk_text};

/// Chunks, embeds, and stores extracted document text.
///
/// Embeds only the first `embed_percentage` percent of chunks (rounded up,
/// minimum 1), a cost knob for large manuals where the head of the document
/// carries most of the procedure text.
pub struct DocumentIngestor<S, E> {
    store: Arc<S>,
    embedder: Arc<E>,
}

impl<S: VectorStore, E: Embedder> DocumentIngestor<S, E> {
    pub fn new(store: Arc<S>, embedder: Arc<E>) -> Self {
        Self { store, embedder }
    }

    /// Number of chunks to embed for a given percentage
    fn embed_budget(total: usize, embed_percentage: u8) -> usize {
        let budget = (total * embed_percentage as usize).div_ceil(100).max(1);
        budget.min(total)
    }

    pub async fn ingest(
        &self,
        collection: &str,
        file_name: &str,
        text: &str,
        embed_percentage: u8,
    ) -> Result<UploadReceipt> {
        if embed_percentage == 0 || embed_percentage > 100 {
            return Err(Error::InvalidInput(format!(
                "embed_percentage must be 1-100, got {}",
                embed_percentage
            )));
        }

        let chunks = chunk_text(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
        if chunks.is_empty() {
            return Err(Error::ExtractionFailed(format!(
                "{} produced no usable chunks",
                file_name
            )));
        }

        let budget = Self::embed_budget(chunks.len(), embed_percentage);
        let file_id = Uuid::new_v4().to_string();
        let uploaded_at = chrono::Utc::now().to_rfc3339();

        let mut records = Vec::with_capacity(budget);
        for (index, chunk) in chunks.iter().take(budget).enumerate() {
            let embedding = self.embedder.embed(chunk)?;
            records.push(ChunkRecord {
                id: format!("{}_chunk_{}", file_id, index),
                text: chunk.clone(),
                embedding,
                metadata: json!({
                    "file_id": file_id,
                    "file_name": file_name,
                    "uploaded_at": uploaded_at,
                }),
            });
        }

        self.store.add(collection, records).await?;
        tracing::info!(collection, file_name, chunks = budget, "ingested document");

        Ok(UploadReceipt {
            file_id,
            chunk_count: budget,
        })
    }
}
