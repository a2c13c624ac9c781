//! Error types for the WorkSim system

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the WorkSim system
///
/// Parse degradation (scenario/evaluation text not matching the expected
/// labeled format) is deliberately absent: it is never an error, see
/// [`crate::types::Parsed`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("missing API credential for provider: {0}")]
    MissingCredential(String),

    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider call error: {0}")]
    ProviderCall(String),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
