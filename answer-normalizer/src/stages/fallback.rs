//! Replaces "I don't know" style answers with a redirect.

use regex::Regex;

use super::{Flow, Stage, StageContext};
use crate::errors::NormalizerError;

pub const NO_INFO_REDIRECT: &str = "I don't have details on that yet. Feel free to ask me about my skills, projects, or work experience.";

pub struct NoInfoFallback {
    phrases: Regex,
}

impl NoInfoFallback {
    pub fn new() -> Result<Self, NormalizerError> {
        Ok(Self {
            phrases: Regex::new(
                r"(?i)not provided in the (?:context|information|profile)|(?:don't|do not|doesn't|does not) have (?:that|this|any|enough) information|(?:cannot|can't|can not|unable to) determine|not mentioned in the (?:context|information|profile)|not specified in|no information (?:is )?(?:available|provided)",
            )?,
        })
    }

    pub fn resolve(&self, text: &str) -> String {
        if text.trim().is_empty() || self.phrases.is_match(text) {
            NO_INFO_REDIRECT.to_string()
        } else {
            text.trim().to_string()
        }
    }
}

impl Stage for NoInfoFallback {
    fn name(&self) -> &'static str {
        "no_info_fallback"
    }

    fn apply(&self, text: String, _ctx: &StageContext<'_>) -> Flow {
        Flow::Continue(self.resolve(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_phrases_trigger_the_redirect() {
        let f = NoInfoFallback::new().unwrap();
        for s in [
            "That is not provided in the context.",
            "Sorry, I don't have that information.",
            "I cannot determine my favourite colour from this.",
            "My salary is not mentioned in the context.",
            "",
        ] {
            assert_eq!(f.resolve(s), NO_INFO_REDIRECT, "{s:?}");
        }
    }

    #[test]
    fn the_redirect_is_a_fixed_point() {
        let f = NoInfoFallback::new().unwrap();
        assert_eq!(f.resolve(NO_INFO_REDIRECT), NO_INFO_REDIRECT);
    }

    #[test]
    fn ordinary_answers_pass() {
        let f = NoInfoFallback::new().unwrap();
        assert_eq!(f.resolve("I have led two teams."), "I have led two teams.");
    }
}
