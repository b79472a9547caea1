//! Retrieval helpers: exact cosine scoring and stable top-k selection.

use crate::record::{Passage, RagHit};
use tracing::trace;

/// Cosine similarity in `[-1, 1]`. Zero-length, mismatched or non-finite
/// vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let sim = (dot / (na.sqrt() * nb.sqrt())) as f32;
    if sim.is_finite() { sim } else { 0.0 }
}

/// Scores every `(passage, vector)` entry against `query_vector` and returns
/// the best `top_k` hits.
///
/// Exhaustive and deterministic: hits are ordered by descending score, equal
/// scores keep ingestion order (lower `ordinal` first).
pub fn search_by_vector(
    entries: &[(Passage, Vec<f32>)],
    query_vector: &[f32],
    top_k: usize,
) -> Vec<RagHit> {
    trace!("retrieve::search_by_vector entries={} top_k={top_k}", entries.len());
    if top_k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f32, &Passage)> = entries
        .iter()
        .map(|(p, v)| (cosine(query_vector, v), p))
        .collect();

    scored.sort_by(|(sa, pa), (sb, pb)| sb.total_cmp(sa).then(pa.ordinal.cmp(&pb.ordinal)));

    scored
        .into_iter()
        .take(top_k)
        .map(|(score, p)| RagHit {
            score,
            passage: p.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PassageOffset;

    fn entry(ordinal: usize, v: Vec<f32>) -> (Passage, Vec<f32>) {
        (
            Passage {
                ordinal,
                text: format!("p{ordinal}"),
                offset: PassageOffset {
                    segment: 0,
                    start: ordinal,
                },
            },
            v,
        )
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn hits_are_sorted_by_score() {
        let entries = vec![
            entry(0, vec![0.0, 1.0]),
            entry(1, vec![1.0, 0.0]),
            entry(2, vec![1.0, 1.0]),
        ];
        let hits = search_by_vector(&entries, &[1.0, 0.1], 2);
        let ords: Vec<usize> = hits.iter().map(|h| h.passage.ordinal).collect();
        assert_eq!(ords, vec![1, 2]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn ties_keep_ingestion_order() {
        let entries = vec![
            entry(0, vec![0.0, 1.0]),
            entry(1, vec![3.0, 0.0]),
            entry(2, vec![1.0, 0.0]),
            entry(3, vec![2.0, 0.0]),
        ];
        let hits = search_by_vector(&entries, &[1.0, 0.0], 3);
        let ords: Vec<usize> = hits.iter().map(|h| h.passage.ordinal).collect();
        assert_eq!(ords, vec![1, 2, 3]);
    }

    #[test]
    fn nan_vectors_rank_as_unrelated() {
        let entries = vec![
            entry(0, vec![f32::NAN, 1.0]),
            entry(1, vec![1.0, 0.0]),
            entry(2, vec![f32::NAN, f32::NAN]),
            entry(3, vec![-1.0, 0.0]),
        ];
        let hits = search_by_vector(&entries, &[1.0, 0.0], 4);
        let ords: Vec<usize> = hits.iter().map(|h| h.passage.ordinal).collect();
        assert_eq!(ords, vec![1, 0, 2, 3]);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let entries = vec![entry(0, vec![1.0]), entry(1, vec![1.0])];
        assert_eq!(search_by_vector(&entries, &[1.0], 10).len(), 2);
        assert!(search_by_vector(&entries, &[1.0], 0).is_empty());
    }
}
