//! Tunables for the normalization pipeline.

/// Default length (in chars) above which an answer is trimmed for concision.
pub const DEFAULT_CONCISE_THRESHOLD_CHARS: usize = 420;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Answers longer than this many chars go through the concision trim.
    pub concise_threshold_chars: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            concise_threshold_chars: DEFAULT_CONCISE_THRESHOLD_CHARS,
        }
    }
}

impl NormalizerConfig {
    /// Reads `CONCISE_THRESHOLD_CHARS`; missing or unparsable values use the default.
    pub fn from_env() -> Self {
        let concise_threshold_chars = std::env::var("CONCISE_THRESHOLD_CHARS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_CONCISE_THRESHOLD_CHARS);
        Self {
            concise_threshold_chars,
        }
    }
}
