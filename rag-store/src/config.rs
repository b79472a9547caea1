//! Runtime configuration for chunking and retrieval.

use crate::errors::RagError;

/// Configuration for index construction and retrieval.
#[derive(Clone, Debug, PartialEq)]
pub struct RagConfig {
    /// Target passage size in chars.
    pub chunk_size: usize,
    /// Chars shared by two consecutive passages.
    pub chunk_overlap: usize,
    /// Passages returned per question.
    pub top_k: usize,
    /// Maximum number of concurrent embedding requests during a build.
    pub embedding_concurrency: usize,
    /// Expected vector size; `None` accepts whatever the first vector reports.
    pub embedding_dim: Option<usize>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
            embedding_concurrency: 4,
            embedding_dim: None,
        }
    }
}

impl RagConfig {
    /// Reads `CHUNK_SIZE`, `CHUNK_OVERLAP`, `RAG_TOP_K`, `EMBEDDING_CONCURRENCY`
    /// and `EMBEDDING_DIM`, falling back to [`RagConfig::default`] per field.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the resulting values are inconsistent.
    pub fn from_env() -> Result<Self, RagError> {
        let dflt = Self::default();
        let cfg = Self {
            chunk_size: parse("CHUNK_SIZE", dflt.chunk_size),
            chunk_overlap: parse("CHUNK_OVERLAP", dflt.chunk_overlap),
            top_k: parse("RAG_TOP_K", dflt.top_k),
            embedding_concurrency: parse("EMBEDDING_CONCURRENCY", dflt.embedding_concurrency),
            embedding_dim: std::env::var("EMBEDDING_DIM")
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok()),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be >= 1".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
