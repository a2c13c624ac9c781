//! Chat context retrieval with tiered legacy fallback

use std::collections::HashSet;
use std::sync::Arc;

use worksim_core::{Embedder, Result, VectorStore};

use crate::collection::chat_fallback_chain;

/// Upper bound on documents pulled per retrieval tier
pub const MAX_CONTEXT_DOCS: usize = 20;

/// Dedup hashes cover only this many leading characters. Chunks sharing a
/// longer common prefix (repeated headers) will merge; that is the documented
/// trade-off, not an oversight.
pub const DEDUP_PREFIX_CHARS: usize = 100;

/// Drop near-duplicate documents by md5 of their first
/// [`DEDUP_PREFIX_CHARS`] characters, keeping first-seen order.
pub fn dedup_documents(documents: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for document in documents {
        let prefix: String = document.chars().take(DEDUP_PREFIX_CHARS).collect();
        let digest = format!("{:x}", md5::compute(prefix.as_bytes()));
        if seen.insert(digest) {
            unique.push(document);
        }
    }

    unique
}

/// Retrieves deduplicated conversational context for a chat turn.
///
/// Walks the fallback chain: the scoped collection first, then the unscoped
/// project collection, then the legacy default project, short-circuiting at
/// the first tier that returns anything. Tier errors (including missing
/// collections) count as empty tiers rather than failing the turn.
pub struct ContextRetriever<S, E> {
    store: Arc<S>,
    embedder: Arc<E>,
}

impl<S: VectorStore, E: Embedder> ContextRetriever<S, E> {
    pub fn new(store: Arc<S>, embedder: Arc<E>) -> Self {
        Self { store, embedder }
    }

    async fn tier_documents(&self, collection: &str, embedding: &[f32]) -> Result<Vec<String>> {
        let count = self.store.count(collection).await?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let top_k = MAX_CONTEXT_DOCS.min(count);
        let documents = self.store.query(collection, embedding, top_k).await?;
        Ok(dedup_documents(documents))
    }

    /// Retrieve context documents for a chat message
    pub async fn chat_context(
        &self,
        project_id: &str,
        user_id: Option<&str>,
        message: &str,
    ) -> Vec<String> {
        let embedding = match self.embedder.embed(message) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed; continuing without context");
                return Vec::new();
            }
        };

        for collection in chat_fallback_chain(project_id, user_id) {
            match self.tier_documents(&collection, &embedding).await {
                Ok(documents) if !documents.is_empty() => {
                    tracing::debug!(collection, docs = documents.len(), "retrieved chat context");
                    return documents;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(collection, error = %e, "retrieval tier failed; trying next");
                    continue;
                }
            }
        }

        Vec::new()
    }
}
