//! Embedding executor with concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError, record::Passage};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Embeds every passage and returns the vectors in passage order.
///
/// # Arguments
/// - `passages`: passages to embed.
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size; otherwise the first
///   vector fixes the size for the rest.
/// - `concurrency`: maximum number of concurrent embedding requests.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions disagree, or the
/// provider's error for the first failing request.
pub async fn embed_all(
    passages: &[Passage],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    info!(
        "embed_pool::embed_all: total={} concurrency={}",
        passages.len(),
        concurrency
    );

    if passages.is_empty() {
        debug!("embed_pool::embed_all: nothing to embed");
        return Ok(Vec::new());
    }

    let results: Vec<(usize, Vec<f32>)> = stream::iter(passages.iter().enumerate())
        .map(|(i, p)| async move {
            let v = provider.embed(&p.text).await?;
            Ok::<(usize, Vec<f32>), RagError>((i, v))
        })
        .buffer_unordered(concurrency.max(1))
        .boxed()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; passages.len()];
    let mut want = expected_dim;
    for (i, v) in results {
        match want {
            Some(w) if v.len() != w => {
                return Err(RagError::VectorSizeMismatch { got: v.len(), want: w });
            }
            None => want = Some(v.len()),
            _ => {}
        }
        slots[i] = Some(v);
    }

    debug!("embed_pool::embed_all: embeddings filled");
    slots
        .into_iter()
        .map(|v| v.ok_or_else(|| RagError::Unavailable("embedding missing for passage".into())))
        .collect()
}
