//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document is missing, unreadable or empty.
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Embedding backend reported a failure.
    #[error("embedding error: {0}")]
    Embedding(#[from] ai_llm_service::AiLlmError),

    /// Embedding backend could not be reached (non-Ollama providers, tests).
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    /// Mismatch in vector dimensionality across records.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The corpus produced no passages, so there is nothing to search.
    #[error("retrieval index is empty")]
    EmptyIndex,
}
