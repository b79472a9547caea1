//! Removes model "thinking" spans emitted before the answer.

use regex::Regex;

use super::{Flow, Stage, StageContext};
use crate::errors::NormalizerError;

pub struct StripReasoning {
    closed: Regex,
    lone_close: Regex,
    lone_open: Regex,
}

impl StripReasoning {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            closed: Regex::new(
                r"(?is)<\s*(?:think|thinking|reasoning)\s*>.*?<\s*/\s*(?:think|thinking|reasoning)\s*>",
            )?,
            lone_close: Regex::new(r"(?is)^.*<\s*/\s*(?:think|thinking|reasoning)\s*>")?,
            // Unclosed: runs to the first blank line or to the end.
            lone_open: Regex::new(r"(?is)<\s*(?:think|thinking|reasoning)\s*>.*?(?:\n\s*\n|\z)")?,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        let s = self.closed.replace_all(text, "");
        let s = self.lone_close.replace(&s, "");
        let s = self.lone_open.replace_all(&s, "");
        s.trim().to_string()
    }
}

impl Stage for StripReasoning {
    fn name(&self) -> &'static str {
        "strip_reasoning"
    }

    fn apply(&self, text: String, _ctx: &StageContext<'_>) -> Flow {
        Flow::Continue(self.strip(&text))
    }
}
