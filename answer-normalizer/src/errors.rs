//! Error type for building a normalizer.

use thiserror::Error;

/// Errors raised while loading a persona or compiling the rule set.
///
/// Normalization itself never fails; only construction does.
#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persona file is not valid YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid persona: {0}")]
    Persona(String),

    /// A rule pattern failed to compile (names are spliced into patterns).
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}
