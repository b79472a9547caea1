//! Removes label prefixes, markdown emphasis and assistant-style preambles.

use regex::Regex;

use super::{Flow, Stage, StageContext};
use crate::errors::NormalizerError;

pub struct StripArtifacts {
    labels: Regex,
    headings: Regex,
    strong: Regex,
    italic: Regex,
    preambles: Regex,
    acknowledgements: Regex,
}

impl StripArtifacts {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            labels: Regex::new(r"(?im)^[ \t]*(?:final answer|answer|response)[ \t]*:[ \t]*")?,
            headings: Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*")?,
            strong: Regex::new(r"\*\*|__|`")?,
            italic: Regex::new(r"\*([^*\n]+?)\*")?,
            preambles: Regex::new(
                r"(?i)\b(?:I'll be helpful|I will be helpful|Let me help you with that|I'd be (?:happy|glad) to help(?: you)?(?: with that)?|I'm (?:happy|glad) to help(?: you)?(?: with that)?)[.!]?[ \t]*",
            )?,
            acknowledgements: Regex::new(
                r"(?i)^\s*(?:(?:sure thing|sure|certainly|of course|absolutely|great question)\b\s*[!,.:]*\s*)+",
            )?,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        let mut cur = text.trim().to_string();
        // A removal can expose another artifact at the front ("Sure! Answer: ...").
        // Every pass only removes text, so this reaches a fixed point.
        loop {
            let next = self.pass(&cur);
            if next == cur {
                return cur;
            }
            cur = next;
        }
    }

    fn pass(&self, text: &str) -> String {
        let s = self.labels.replace_all(text, "");
        let s = self.headings.replace_all(&s, "");
        let s = self.strong.replace_all(&s, "");
        let s = self.italic.replace_all(&s, "$1");
        let s = self.preambles.replace_all(&s, "");
        let s = self.acknowledgements.replace(&s, "");
        s.trim().to_string()
    }
}

impl Stage for StripArtifacts {
    fn name(&self) -> &'static str {
        "strip_artifacts"
    }

    fn apply(&self, text: String, _ctx: &StageContext<'_>) -> Flow {
        Flow::Continue(self.strip(&text))
    }
}
