//! Sentence segmentation shared by dedup and concision.
//!
//! Segments keep their trailing whitespace, so concatenating every segment
//! reproduces the input exactly.

const ABBREVIATIONS: &[&str] = &["e.g", "i.e", "mr", "mrs", "ms", "dr", "vs", "etc", "st", "jr", "sr"];

/// Splits `text` into sentence segments.
///
/// A segment ends after a run of `.`, `!` or `?` followed by whitespace (or
/// end of text). Line breaks alone do not end a segment, so laying a list out
/// on separate lines does not change where sentences end. A period does not
/// end a sentence when it closes a 1-2 digit list marker ("1.") or a known
/// abbreviation.
pub fn split(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut seg_start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (_, c) = chars[i];
        let is_break = match c {
            '.' | '!' | '?' => {
                let mut j = i;
                while j + 1 < chars.len() && matches!(chars[j + 1].1, '.' | '!' | '?') {
                    j += 1;
                }
                let followed_by_space = j + 1 >= chars.len() || chars[j + 1].1.is_whitespace();
                let ends = followed_by_space && !(c == '.' && j == i && is_non_terminal(text, chars[i].0));
                i = j;
                ends
            }
            _ => false,
        };

        if is_break {
            // Swallow the whitespace run that follows.
            let mut k = i + 1;
            while k < chars.len() && chars[k].1.is_whitespace() {
                k += 1;
            }
            let end = chars.get(k).map(|(b, _)| *b).unwrap_or(text.len());
            out.push(&text[seg_start..end]);
            seg_start = end;
            i = k;
            continue;
        }
        i += 1;
    }

    if seg_start < text.len() {
        out.push(&text[seg_start..]);
    }
    out
}

/// Dedup key: lowercase with whitespace collapsed. Bullet glyphs compare
/// equal to `-`, the bullet list formatting writes.
pub fn key(sentence: &str) -> String {
    sentence
        .split_whitespace()
        .map(|w| if matches!(w, "•" | "*") { "-" } else { w })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True if the period at byte `dot` closes a list marker or an abbreviation.
fn is_non_terminal(text: &str, dot: usize) -> bool {
    let before = &text[..dot];
    let token = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    if token.is_empty() {
        return false;
    }
    if token.len() <= 2 && token.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let lower = token.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}
