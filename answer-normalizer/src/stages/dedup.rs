//! Sentence-level deduplication.

use std::collections::HashSet;

use crate::sentences;

/// Keeps the first occurrence of every sentence, compared case- and
/// whitespace-insensitively. Kept sentences retain their original text.
pub fn dedup_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut out = String::with_capacity(text.len());
    for seg in sentences::split(text) {
        let key = sentences::key(seg);
        if key.is_empty() || seen.insert(key) {
            out.push_str(seg);
        }
    }
    out.trim().to_string()
}
