//! In-memory retrieval store: corpus loading, chunking, embedding and search.
//!
//! This crate provides the build-time half of the RAG flow:
//! - Load raw text from a [`CorpusSource`]
//! - Split it into overlapping [`Passage`]s with a [`Chunker`]
//! - Embed the passages and keep them in a [`RetrievalIndex`]
//!
//! Search is exact cosine similarity over every passage, so results are
//! deterministic for identical inputs.

mod chunker;
mod config;
mod corpus;
pub mod embed;
mod embed_pool;
mod errors;
mod index;
mod record;
mod retrieve;

pub use chunker::Chunker;
pub use config::RagConfig;
pub use corpus::{CorpusSource, FileCorpus, StaticCorpus};
pub use embed::EmbeddingsProvider;
pub use embed::ollama::{OllamaConfig, OllamaEmbedder};
pub use errors::RagError;
pub use index::RetrievalIndex;
pub use record::{Passage, PassageOffset, RagHit};
pub use retrieve::cosine;

use tracing::{debug, trace};

/// Loads `corpus`, splits it with `cfg` chunking and embeds the result.
///
/// # Errors
/// Corpus, config and embedding errors propagate unchanged; a corpus that
/// yields no passages is [`RagError::EmptyIndex`].
pub async fn build_index(
    cfg: &RagConfig,
    corpus: &dyn CorpusSource,
    provider: &dyn EmbeddingsProvider,
) -> Result<RetrievalIndex, RagError> {
    trace!("rag_store::build_index source={}", corpus.describe());
    let chunker = Chunker::new(cfg.chunk_size, cfg.chunk_overlap)?;
    let segments = corpus.load().await?;
    let passages = chunker.split_segments(&segments);
    debug!(
        segments = segments.len(),
        passages = passages.len(),
        "rag_store::build_index chunked"
    );
    RetrievalIndex::build(
        passages,
        provider,
        cfg.embedding_dim,
        cfg.embedding_concurrency,
    )
    .await
}
