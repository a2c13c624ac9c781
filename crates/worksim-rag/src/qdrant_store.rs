//! Qdrant-backed vector store

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use worksim_core::{ChunkRecord, Error, Result, VectorStore};

/// Qdrant-backed collection store.
///
/// Collections are created lazily with cosine distance. Chunk ids are carried
/// in the payload (`chunk_id`) because Qdrant point ids must be UUIDs; the
/// point id itself is a fresh v4 per upsert.
pub struct QdrantVectorStore {
    client: Qdrant,
    dimension: usize,
}

impl QdrantVectorStore {
    pub fn new(url: &str, dimension: usize) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| Error::VectorStore(format!("qdrant connect: {}", e)))?;

        Ok(Self { client, dimension })
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant collection check: {}", e)))
    }

    async fn ensure_collection(&self, collection: &str) -> Result<()> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        let create = CreateCollectionBuilder::new(collection)
            .vectors_config(VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine));

        if let Err(e) = self.client.create_collection(create).await {
            // lost a create race: fine as long as the collection is there now
            if !self.collection_exists(collection).await.unwrap_or(false) {
                return Err(Error::VectorStore(format!("qdrant create collection: {}", e)));
            }
        } else {
            tracing::info!(collection, "created qdrant collection");
        }

        Ok(())
    }

    fn payload_text(payload: &HashMap<String, Value>) -> Option<String> {
        match payload.get("text") {
            Some(Value {
                kind: Some(Kind::StringValue(s)),
            }) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Flatten a chunk record into the stored payload: metadata fields plus
/// `text` and `chunk_id`.
fn build_payload(record: &ChunkRecord) -> serde_json::Value {
    let mut payload = match &record.metadata {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    payload.insert("text".to_string(), serde_json::Value::String(record.text.clone()));
    payload.insert("chunk_id".to_string(), serde_json::Value::String(record.id.clone()));
    serde_json::Value::Object(payload)
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn add(&self, collection: &str, chunks: Vec<ChunkRecord>) -> Result<()> {
        self.ensure_collection(collection).await?;

        let mut points = Vec::with_capacity(chunks.len());
        for record in &chunks {
            let payload = Payload::try_from(build_payload(record))
                .map_err(|e| Error::Serialization(format!("qdrant payload: {}", e)))?;
            points.push(PointStruct::new(
                Uuid::new_v4().to_string(),
                record.embedding.clone(),
                payload,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant upsert: {}", e)))?;

        Ok(())
    }

    async fn query(&self, collection: &str, embedding: &[f32], top_k: usize) -> Result<Vec<String>> {
        if !self.collection_exists(collection).await? {
            return Ok(Vec::new());
        }

        let search = SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
            .with_payload(true);

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant search: {}", e)))?;

        Ok(response
            .result
            .iter()
            .filter_map(|point| Self::payload_text(&point.payload))
            .collect())
    }

    async fn peek(&self, collection: &str, limit: usize) -> Result<Vec<String>> {
        if !self.collection_exists(collection).await? {
            return Ok(Vec::new());
        }

        let scroll = ScrollPointsBuilder::new(collection)
            .limit(limit as u32)
            .with_payload(true);

        let response = self
            .client
            .scroll(scroll)
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant scroll: {}", e)))?;

        Ok(response
            .result
            .iter()
            .filter_map(|point| Self::payload_text(&point.payload))
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.collection_exists(collection).await? {
            return Ok(0);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant count: {}", e)))?;

        Ok(response.result.map_or(0, |r| r.count as usize))
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        if !self.collection_exists(collection).await? {
            return Err(Error::VectorStore(format!(
                "unknown collection: {}",
                collection
            )));
        }

        self.client
            .delete_collection(collection)
            .await
            .map_err(|e| Error::VectorStore(format!("qdrant delete collection: {}", e)))?;

        Ok(())
    }
}
