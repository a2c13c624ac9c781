//! Hash-feature text embedder

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use worksim_core::{Embedder, Result};

/// Deterministic hash-based embedder.
///
/// Maps word and bigram hashes onto a fixed-dimension feature vector with
/// position-decayed weights, then L2-normalizes. Not a learned model: the
/// store treats embeddings as opaque, and a deterministic function keeps
/// retrieval reproducible without a model download. Swap in a real model by
/// implementing [`Embedder`].
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Standard dimension for sentence embeddings
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_of(token: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut embedding = vec![0.0f32; self.dimension];

        for (i, word) in words.iter().enumerate() {
            let hash = Self::hash_of(word);
            let base_idx = (hash as usize) % self.dimension;

            // position-based weighting: early words carry more signal
            let weight = 1.0 / (1.0 + i as f32 * 0.1);
            embedding[base_idx] += weight;

            if word.len() > 3 {
                let secondary_idx = ((hash >> 16) as usize) % self.dimension;
                embedding[secondary_idx] += weight * 0.5;
            }
        }

        for window in words.windows(2) {
            let bigram = format!("{} {}", window[0], window[1]);
            let idx = (Self::hash_of(&bigram) as usize) % self.dimension;
            embedding[idx] += 0.3;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
