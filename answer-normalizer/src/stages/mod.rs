//! Pipeline stages.
//!
//! Every stage is a pure text-in/text-out transform. The order in which they
//! run is declared once, in [`crate::ResponseNormalizer::new`].

pub mod artifacts;
pub mod concision;
pub mod dedup;
pub mod fallback;
pub mod intents;
pub mod lists;
pub mod pronouns;
pub mod reasoning;

/// What a stage hands to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Feed the text to the next stage.
    Continue(String),
    /// Stop here; the text is the final answer.
    Finish(String),
}

/// Per-call inputs shared by every stage.
#[derive(Clone, Copy, Debug)]
pub struct StageContext<'a> {
    /// The user's question as asked, never the model text.
    pub question: &'a str,
}

pub trait Stage: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn apply(&self, text: String, ctx: &StageContext<'_>) -> Flow;
}

/// Stage built from a plain function that never short-circuits.
pub struct FnStage {
    name: &'static str,
    f: fn(&str) -> String,
}

impl FnStage {
    pub const fn new(name: &'static str, f: fn(&str) -> String) -> Self {
        Self { name, f }
    }
}

impl Stage for FnStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, text: String, _ctx: &StageContext<'_>) -> Flow {
        Flow::Continue((self.f)(&text))
    }
}

/// Capitalizes the first letter of `s`, leaving the rest untouched.
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_lowercase() => c.to_uppercase().chain(chars).collect(),
        _ => s.to_string(),
    }
}
