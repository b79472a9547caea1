//! Core data models used by the library.

use serde::Serialize;

/// Where a passage came from: which corpus segment and the char offset inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PassageOffset {
    /// Index of the corpus segment (file) the passage was cut from.
    pub segment: usize,
    /// Offset of the first char of the passage inside its segment (in chars).
    pub start: usize,
}

/// A chunk of source text indexed for retrieval.
///
/// Passages are immutable once created; `ordinal` is the ingestion order and
/// breaks score ties during retrieval.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Passage {
    pub ordinal: usize,
    pub text: String,
    pub offset: PassageOffset,
}

/// A single retrieval hit: similarity score plus the passage it points to.
#[derive(Clone, Debug, Serialize)]
pub struct RagHit {
    pub score: f32,
    pub passage: Passage,
}

impl RagHit {
    /// Passage text, the part that ends up in the prompt.
    pub fn text(&self) -> &str {
        &self.passage.text
    }
}
