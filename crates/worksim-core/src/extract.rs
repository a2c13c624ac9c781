//! Document text extraction trait

use crate::Result;

/// Trait for per-format text extractors.
///
/// Extraction is an external collaborator from the core's point of view:
/// implementations own their OCR/table heuristics and only promise
/// "bytes in, plain text out". Registered per lowercase file extension.
pub trait TextExtractor: Send + Sync {
    /// File extensions (lowercase, no dot) this extractor handles
    fn extensions(&self) -> &'static [&'static str];

    /// Extract plain text from raw file bytes
    fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}
