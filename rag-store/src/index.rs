//! In-memory retrieval index: passages paired 1:1 with their embeddings.

use std::time::Instant;

use tracing::{debug, info};

use crate::{
    embed::EmbeddingsProvider,
    embed_pool,
    errors::RagError,
    record::{Passage, RagHit},
    retrieve,
};

/// Ordered collection of `(Passage, vector)` pairs.
///
/// Built once and never mutated; rebuilding means building a new value.
#[derive(Clone, Debug)]
pub struct RetrievalIndex {
    entries: Vec<(Passage, Vec<f32>)>,
    dim: usize,
}

impl RetrievalIndex {
    /// Embeds `passages` and builds the index.
    ///
    /// # Errors
    /// - [`RagError::EmptyIndex`] when `passages` is empty.
    /// - Provider errors and dimension mismatches from the embedding pass.
    pub async fn build(
        passages: Vec<Passage>,
        provider: &dyn EmbeddingsProvider,
        expected_dim: Option<usize>,
        concurrency: usize,
    ) -> Result<Self, RagError> {
        if passages.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let t0 = Instant::now();
        let vectors = embed_pool::embed_all(&passages, provider, expected_dim, concurrency).await?;
        let dim = vectors.first().map(Vec::len).unwrap_or_default();

        let entries: Vec<(Passage, Vec<f32>)> = passages.into_iter().zip(vectors).collect();
        info!(
            passages = entries.len(),
            dim,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "retrieval index built"
        );
        Ok(Self { entries, dim })
    }

    /// Builds an index from already computed vectors.
    ///
    /// # Errors
    /// [`RagError::EmptyIndex`] for no entries, [`RagError::VectorSizeMismatch`]
    /// when vectors disagree on dimension.
    pub fn from_entries(entries: Vec<(Passage, Vec<f32>)>) -> Result<Self, RagError> {
        let dim = entries.first().map(|(_, v)| v.len()).ok_or(RagError::EmptyIndex)?;
        if let Some((_, v)) = entries.iter().find(|(_, v)| v.len() != dim) {
            return Err(RagError::VectorSizeMismatch {
                got: v.len(),
                want: dim,
            });
        }
        Ok(Self { entries, dim })
    }

    /// Embeds `text` and returns up to `k` hits by descending similarity.
    ///
    /// # Errors
    /// Provider errors propagate; a query vector of the wrong size is a
    /// [`RagError::VectorSizeMismatch`].
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RagHit>, RagError> {
        let qv = provider.embed(text).await?;
        if qv.len() != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got: qv.len(),
                want: self.dim,
            });
        }
        let hits = retrieve::search_by_vector(&self.entries, &qv, k);
        debug!(k, hits = hits.len(), "retrieval query answered");
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Passages in ingestion order.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries.iter().map(|(p, _)| p)
    }
}
