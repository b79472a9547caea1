//! Concision trim for long answers.

use regex::Regex;
use tracing::debug;

use super::{Flow, Stage, StageContext, lists::ListKind};
use crate::{errors::NormalizerError, sentences};

const STOPWORDS: &[&str] = &[
    "what", "which", "who", "whom", "where", "when", "why", "how", "your", "you", "yours", "are",
    "the", "and", "about", "tell", "have", "has", "had", "does", "did", "can", "could", "would",
    "should", "will", "please", "with", "for", "from", "that", "this", "there", "any", "some",
    "was", "were", "been", "being", "into", "like", "more", "most", "much", "many", "give", "share",
    "describe", "explain", "me", "do", "is", "a", "an", "of", "to", "in", "on", "at", "it", "my",
];

/// Keeps the first sentence or two of a long answer when they address the
/// question, otherwise a "worked on ..." sentence, otherwise everything.
pub struct ConcisionTrim {
    threshold_chars: usize,
    worked_on: Regex,
    lists: ListKind,
}

impl ConcisionTrim {
    pub fn new(threshold_chars: usize) -> Result<Self, NormalizerError> {
        Ok(Self {
            threshold_chars,
            worked_on: Regex::new(r"(?i)\b(?:worked|working|work)\s+on\b")?,
            lists: ListKind::new()?,
        })
    }

    pub fn trim(&self, text: &str, question: &str) -> String {
        if text.chars().count() <= self.threshold_chars {
            return text.to_string();
        }
        // Lists are formatted, not cut.
        if self.lists.is_list_question(question) && self.lists.has_markers(text) {
            return text.to_string();
        }

        let keywords = keywords(question);
        let addresses = |s: &str| {
            let lower = s.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        };

        let parts = sentences::split(text);
        if let Some(first) = parts.first().filter(|s| addresses(s)) {
            let mut out = first.to_string();
            let mut kept = 1;
            if let Some(second) = parts.get(1).filter(|s| addresses(s)) {
                out.push_str(second);
                kept += 1;
            }
            debug!(kept, "concision: leading sentences kept");
            return out.trim().to_string();
        }

        if let Some(w) = parts.iter().find(|s| self.worked_on.is_match(s)) {
            debug!("concision: worked-on sentence kept");
            return w.trim().to_string();
        }
        text.to_string()
    }
}

/// Content words of the question, lowercased, with a trailing plural `s`
/// dropped so "projects" also finds "project".
fn keywords(question: &str) -> Vec<String> {
    question
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.as_str()))
        .map(|w| match w.strip_suffix('s') {
            Some(stem) if stem.chars().count() >= 3 && !w.ends_with("ss") => stem.to_string(),
            _ => w,
        })
        .collect()
}

impl Stage for ConcisionTrim {
    fn name(&self) -> &'static str {
        "concision_trim"
    }

    fn apply(&self, text: String, ctx: &StageContext<'_>) -> Flow {
        Flow::Continue(self.trim(&text, ctx.question))
    }
}
