//! Typed error for the contextor crate.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// The retrieval index could not be built. Every caller waiting on the
    /// same build receives the same message.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// The language model call failed or returned a non-2xx status.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Generation did not finish before the deadline.
    #[error("generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The request carried no question.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// Errors from the underlying rag-store crate (retrieval at request time).
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// Invalid settings or persona.
    #[error("config error: {0}")]
    Config(String),
}

impl From<answer_normalizer::NormalizerError> for ContextorError {
    fn from(e: answer_normalizer::NormalizerError) -> Self {
        ContextorError::Config(e.to_string())
    }
}

