//! Fixed-size overlapping chunking.
//!
//! Windows are measured in chars (not bytes) so multi-byte text is never cut
//! inside a code point. Consecutive passages share exactly `overlap` chars.

use crate::{
    errors::RagError,
    record::{Passage, PassageOffset},
};

/// Splits raw text into overlapping fixed-size passages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Creates a chunker with `size` chars per passage and `overlap` shared chars.
    ///
    /// # Errors
    /// Returns `RagError::Config` if `size == 0` or `overlap >= size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, RagError> {
        if size == 0 || overlap >= size {
            return Err(RagError::Config(format!(
                "invalid chunking: size={size}, overlap={overlap} (need 0 <= overlap < size)"
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits a single text. Blank input yields no passages.
    pub fn split(&self, text: &str) -> Vec<Passage> {
        let mut out = Vec::new();
        self.split_into(text, 0, &mut out);
        out
    }

    /// Splits every segment in order; ordinals run across segments.
    pub fn split_segments<S: AsRef<str>>(&self, segments: &[S]) -> Vec<Passage> {
        let mut out = Vec::new();
        for (i, seg) in segments.iter().enumerate() {
            self.split_into(seg.as_ref(), i, &mut out);
        }
        out
    }

    fn split_into(&self, text: &str, segment: usize, out: &mut Vec<Passage>) {
        if text.trim().is_empty() {
            return;
        }

        // Byte offset of every char boundary, plus the end of the string.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();
        let n_chars = bounds.len() - 1;
        let step = self.size - self.overlap;

        let mut start = 0usize;
        loop {
            let end = (start + self.size).min(n_chars);
            out.push(Passage {
                ordinal: out.len(),
                text: text[bounds[start]..bounds[end]].to_string(),
                offset: PassageOffset { segment, start },
            });
            if end == n_chars {
                break;
            }
            start += step;
        }
    }
}
