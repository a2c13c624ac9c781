//! Text embedding trait

use crate::Result;

/// Trait for text embedders.
///
/// One call per chunk on write, one call per query text on read. Embedders
/// are assumed stateless and thread-safe; the invoker-level concurrency
/// policy does not protect them.
pub trait Embedder: Send + Sync {
    /// Embed a text into a fixed-dimension vector
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of produced vectors
    fn dimension(&self) -> usize;
}
