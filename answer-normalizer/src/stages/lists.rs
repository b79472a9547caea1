//! Display formatting for list answers.

use regex::Regex;

use super::{Flow, Stage, StageContext};
use crate::errors::NormalizerError;

/// Recognizes list-type questions and list markers in answers.
pub struct ListKind {
    question: Regex,
    numbered: Regex,
    bulleted: Regex,
}

impl ListKind {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            question: Regex::new(
                r"(?i)\b(?:skills?|tech(?:nology|nologies)?|stack|tools?|languages?|frameworks?|projects?|portfolio|built|experience|work(?:ed)?\s+(?:history|on)|jobs?|roles?|career|clients?)\b",
            )?,
            numbered: Regex::new(r"(?:^|\s+)(\d{1,2}\.)\s+")?,
            bulleted: Regex::new(r"(?:^|\s+)[-•*]\s+")?,
        })
    }

    /// Skills, projects or experience.
    pub fn is_list_question(&self, question: &str) -> bool {
        self.question.is_match(question)
    }

    pub fn has_markers(&self, text: &str) -> bool {
        self.numbered.is_match(text) || self.bulleted.is_match(text)
    }

    /// Puts every marker on its own paragraph; bullets become `- `.
    pub fn format(&self, text: &str) -> String {
        let s = self.numbered.replace_all(text, "\n\n$1 ");
        let s = self.bulleted.replace_all(&s, "\n\n- ");
        s.trim().to_string()
    }
}

pub struct ListFormatting {
    kind: ListKind,
}

impl ListFormatting {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            kind: ListKind::new()?,
        })
    }
}

impl Stage for ListFormatting {
    fn name(&self) -> &'static str {
        "list_formatting"
    }

    fn apply(&self, text: String, ctx: &StageContext<'_>) -> Flow {
        if self.kind.is_list_question(ctx.question) && self.kind.has_markers(&text) {
            Flow::Continue(self.kind.format(&text))
        } else {
            Flow::Continue(text)
        }
    }
}
