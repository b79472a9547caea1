//! Turns a raw model completion into the answer the user sees.
//!
//! [`ResponseNormalizer`] runs a fixed, declared list of stages:
//!
//! 1. strip reasoning spans (`<think>...</think>`, unclosed tags included)
//! 2. strip labels, markdown emphasis and assistant preambles
//! 3. rewrite third person into the persona's first person
//! 4. drop repeated sentences
//! 5. intent overrides keyed on the original question (may finish early)
//! 6. concision trim for long answers
//! 7. list formatting for skills/projects/experience questions
//! 8. "no information" redirect
//!
//! Normalization never fails. Running it again on its own output with the
//! same question returns the same text.

pub mod arithmetic;
pub mod clock;
mod config;
mod errors;
pub mod persona;
pub mod sentences;
pub mod stages;

use std::sync::Arc;

use tracing::{debug, trace};

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_CONCISE_THRESHOLD_CHARS, NormalizerConfig};
pub use errors::NormalizerError;
pub use persona::PersonaProfile;
pub use stages::fallback::NO_INFO_REDIRECT;
pub use stages::intents::PRIVACY_REFUSAL;

use stages::{
    FnStage, Flow, Stage, StageContext, artifacts::StripArtifacts, concision::ConcisionTrim,
    dedup::dedup_sentences, fallback::NoInfoFallback, intents::IntentTable,
    lists::ListFormatting, pronouns::PersonaRewrite, reasoning::StripReasoning,
};

pub struct ResponseNormalizer {
    stages: Vec<Box<dyn Stage>>,
}

impl ResponseNormalizer {
    /// Normalizer with the host clock for date answers.
    pub fn new(persona: &PersonaProfile, cfg: &NormalizerConfig) -> Result<Self, NormalizerError> {
        Self::with_clock(persona, cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(
        persona: &PersonaProfile,
        cfg: &NormalizerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NormalizerError> {
        persona.validate()?;
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(StripReasoning::new()?),
            Box::new(StripArtifacts::new()?),
            Box::new(PersonaRewrite::new(persona)?),
            Box::new(FnStage::new("sentence_dedup", dedup_sentences)),
            Box::new(IntentTable::new(persona, clock)?),
            Box::new(ConcisionTrim::new(cfg.concise_threshold_chars)?),
            Box::new(ListFormatting::new()?),
            Box::new(NoInfoFallback::new()?),
        ];
        debug!(stages = stages.len(), persona = %persona.full_name, "response normalizer ready");
        Ok(Self { stages })
    }

    /// Runs every stage in order over `raw`; `question` is the user's
    /// question as asked.
    pub fn normalize(&self, raw: &str, question: &str) -> String {
        let ctx = StageContext { question };
        let mut text = raw.to_string();
        for stage in &self.stages {
            match stage.apply(text, &ctx) {
                Flow::Continue(next) => text = next,
                Flow::Finish(done) => {
                    trace!(stage = stage.name(), "normalization finished early");
                    return done.trim().to_string();
                }
            }
        }
        text.trim().to_string()
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ResponseNormalizer {
        let clock = FixedClock::at(2026, 10, 19, 9, 30).unwrap();
        ResponseNormalizer::with_clock(
            &PersonaProfile::default(),
            &NormalizerConfig::default(),
            Arc::new(clock),
        )
        .unwrap()
    }

    #[test]
    fn stage_order_is_declared() {
        assert_eq!(
            normalizer().stage_names(),
            vec![
                "strip_reasoning",
                "strip_artifacts",
                "persona_rewrite",
                "sentence_dedup",
                "intent_override",
                "concision_trim",
                "list_formatting",
                "no_info_fallback",
            ]
        );
    }

    #[test]
    fn raw_completion_is_cleaned_end_to_end() {
        let raw = "<think>The user asks about Rust.</think>\nAnswer: **Sure!** Alex has used Rust for five years. \
                   He loves its type system. he loves its type system.";
        assert_eq!(
            normalizer().normalize(raw, "How long have you used Rust?"),
            "I have used Rust for five years. I love its type system."
        );
    }

    #[test]
    fn arithmetic_ignores_model_text() {
        assert_eq!(normalizer().normalize("The answer is forty-two-ish.", "what is 7 * 6?"), "42");
    }

    #[test]
    fn greeting_ignores_model_text() {
        let n = normalizer();
        let expected = "Hi! I'm Alex. Ask me anything about my background, skills, or projects.";
        assert_eq!(n.normalize("Hello! Alex here, how can he help?", "hi"), expected);
        assert_eq!(n.normalize("", "hi"), expected);
    }

    #[test]
    fn personal_info_is_refused_whatever_the_model_says() {
        assert_eq!(
            normalizer().normalize("I live at 12 Main Street.", "what's your address"),
            PRIVACY_REFUSAL
        );
    }

    #[test]
    fn duplicates_keep_first_occurrence_order() {
        let out = normalizer().normalize(
            "I lead a platform team. I enjoy mentoring. I LEAD a  platform team. I enjoy mentoring.",
            "How do you spend your days?",
        );
        assert_eq!(out, "I lead a platform team. I enjoy mentoring.");
    }

    #[test]
    fn unusable_completion_becomes_the_redirect() {
        let n = normalizer();
        assert_eq!(
            n.normalize("<think>hmm</think>That is not provided in the context.", "What is your favourite film?"),
            NO_INFO_REDIRECT
        );
        assert_eq!(n.normalize("<think>never closed", "Why backend work?"), NO_INFO_REDIRECT);
    }

    /// Distinct filler sentences, long enough to cross the concision threshold.
    fn tail(n: usize) -> String {
        (0..n)
            .map(|i| format!("On weekend {i} I went hiking and read about history. "))
            .collect()
    }

    #[test]
    fn list_answers_are_formatted_not_trimmed() {
        let raw = format!(
            "Alex's toolbox: 1. Rust for services 2. Go for CLIs 3. Postgres for storage. {}",
            tail(9)
        );
        let out = normalizer().normalize(&raw, "Which tools do you rely on?");
        assert!(out.starts_with("My toolbox:\n\n1. Rust for services\n\n2. Go for CLIs\n\n3. Postgres"));
        assert!(out.ends_with("On weekend 8 I went hiking and read about history."));
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = normalizer();
        let addressed = format!("I have shipped Rust services for years. Rust keeps me honest. {}", tail(9));
        let worked_on = format!("{}I worked on a trading engine.", tail(9));
        let cases = [
            ("<think>x</think>Alex is a backend engineer. Alex's focus is APIs.", "Why backend work?"),
            ("Sure! He has worked on a ledger in Go. He has worked on a ledger in Go.", "Why Go?"),
            (addressed.as_str(), "Why Rust?"),
            (worked_on.as_str(), "What was hardest?"),
            ("Toolbox: - Rust - Go\n1. Kubernetes", "Which tools do you rely on?"),
            ("I cannot determine that.", "What is your favourite film?"),
            ("i think the candidate's strength is design, e.g. api design.", "What is your strength?"),
            ("Toolbox: - Rust. - Go. - Rust.", "Which tools do you rely on?"),
            ("Toolbox: - Go. • Rust. - Rust.", "Which tools do you rely on?"),
            ("Sure! Sure! Sure! Sure! Sure! Sure! I like servers.", "Why backend work?"),
        ];
        for (raw, q) in cases {
            let once = n.normalize(raw, q);
            assert_eq!(n.normalize(&once, q), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn concise_threshold_comes_from_config() {
        let n = ResponseNormalizer::new(
            &PersonaProfile::default(),
            &NormalizerConfig {
                concise_threshold_chars: 30,
            },
        )
        .unwrap();
        assert_eq!(
            n.normalize("I write Rust every day. I also garden a lot.", "Do you write Rust?"),
            "I write Rust every day."
        );
    }
}
