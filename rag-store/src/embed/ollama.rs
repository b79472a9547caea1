//! Ollama embedding provider backed by the shared [`LlmServiceProfiles`].

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::{EmbeddingsProvider, RagError};

/// Configuration for the Ollama embedding backend.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    pub svc: Arc<LlmServiceProfiles>,
    /// Expected embedding dimension size (`None` = accept any).
    pub dim: Option<usize>,
}

/// Ollama embedding provider (async).
#[derive(Clone, Debug)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl OllamaEmbedder {
    /// Construct a new embedder from configuration.
    pub fn new(cfg: OllamaConfig) -> Self {
        Self {
            svc: cfg.svc,
            dim: cfg.dim,
        }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self.svc.embed(text).await?;

            if let Some(want) = self.dim {
                if resp.len() != want {
                    return Err(RagError::VectorSizeMismatch {
                        got: resp.len(),
                        want,
                    });
                }
            }

            Ok(resp)
        })
    }
}
